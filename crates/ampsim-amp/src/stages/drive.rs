//! Second gain stage with asymmetric clipping and a compression pass.

use ampsim_core::{ClipCurve, Effect, SmoothedParam, asymmetric_clip, fast_tanh};

/// Softer positive half.
const POSITIVE: ClipCurve = ClipCurve::new(0.8, 1.25);
/// Harder negative half.
const NEGATIVE: ClipCurve = ClipCurve::new(1.2, 0.83);
/// Final low-drive pass.
const COMPRESSION: ClipCurve = ClipCurve::new(0.9, 1.1);

const GAIN_SMOOTHING_MS: f32 = 10.0;

/// Drive stage.
///
/// Stage gain is `1 + 2·amount` for a drive amount in `[0, 10]`. Output
/// magnitude never exceeds 1.1.
#[derive(Debug, Clone)]
pub struct DriveStage {
    gain: SmoothedParam,
}

impl DriveStage {
    /// Drive stage at amount 0 (unity gain).
    pub fn new(sample_rate: f32) -> Self {
        Self {
            gain: SmoothedParam::with_config(1.0, sample_rate, GAIN_SMOOTHING_MS),
        }
    }

    /// Stage gain for a drive amount.
    #[inline]
    pub fn gain_for_amount(amount: f32) -> f32 {
        1.0 + 2.0 * amount.clamp(0.0, 10.0)
    }

    /// Target drive amount in `[0, 10]`.
    pub fn set_amount(&mut self, amount: f32) {
        self.gain.set_target(Self::gain_for_amount(amount));
    }

    /// Jump to the target gain.
    pub fn snap(&mut self) {
        self.gain.snap_to_target();
    }
}

impl Effect for DriveStage {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let driven = input * self.gain.advance();
        let clipped = asymmetric_clip(driven, POSITIVE, NEGATIVE);
        COMPRESSION.apply(clipped)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.gain.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.gain.snap_to_target();
    }
}

/// Magnitude bound of [`DriveStage`] output.
pub const DRIVE_CEILING: f32 = 1.1;
