//! Push-pull power amp with supply sag.

use ampsim_core::{Effect, EnvelopeFollower, fast_tanh};

// Per-sample weights 0.3 and 0.01 at 48 kHz, held as times so the sag
// keeps its speed at every oversampling factor.
const ATTACK_MS: f32 = 0.0584;
const RELEASE_MS: f32 = 2.073;
/// Headroom lost at full envelope.
const MAX_SAG: f32 = 0.3;
const INPUT_DRIVE: f32 = 1.5;
/// Residual even harmonic from imperfect push-pull cancellation.
const EVEN_HARMONIC: f32 = 0.1;

/// Power amp stage.
///
/// An envelope follower tracks `|x|`; the stage loses up to 30% of its
/// headroom as the envelope rises, then saturates symmetrically and adds
/// a small `y²` term signed like the input. Output magnitude never exceeds
/// 1.1.
#[derive(Debug, Clone)]
pub struct PowerAmp {
    envelope: EnvelopeFollower,
}

impl PowerAmp {
    /// Create the stage at `sample_rate` with a settled envelope.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            envelope: EnvelopeFollower::with_times(sample_rate, ATTACK_MS, RELEASE_MS),
        }
    }

    /// Current headroom multiplier in `[0.7, 1.0]`.
    pub fn headroom(&self) -> f32 {
        1.0 - MAX_SAG * self.envelope.level().min(1.0)
    }
}

impl Effect for PowerAmp {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.envelope.process(input);
        let y = fast_tanh(input * INPUT_DRIVE * self.headroom());
        y + EVEN_HARMONIC * y * y * input.signum()
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.envelope.set_times(sample_rate, ATTACK_MS, RELEASE_MS);
    }

    fn reset(&mut self) {
        self.envelope.reset();
    }
}
