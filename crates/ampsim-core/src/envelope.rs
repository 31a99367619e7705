//! Envelope follower for tracking signal amplitude.
//!
//! The power-amp sag model reads a follower every sample to decide how much
//! headroom to take away.

use libm::expf;

/// Peak envelope follower with asymmetric attack/release smoothing.
///
/// Each sample the level moves toward `|input|` by a fixed fraction: the
/// attack weight when the input is above the level, the release weight when
/// it is below.
///
/// # Example
///
/// ```rust
/// use ampsim_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::with_weights(0.3, 0.01);
/// assert!((env.process(-1.0) - 0.3).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    /// Current envelope level (linear)
    envelope: f32,
    /// Per-sample weight while rising
    attack_weight: f32,
    /// Per-sample weight while falling
    release_weight: f32,
}

impl EnvelopeFollower {
    /// Create a follower from per-sample weights in `(0, 1]`.
    pub fn with_weights(attack_weight: f32, release_weight: f32) -> Self {
        Self {
            envelope: 0.0,
            attack_weight: attack_weight.clamp(f32::EPSILON, 1.0),
            release_weight: release_weight.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Create a follower from attack/release time constants.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        Self::with_weights(
            time_to_weight(attack_ms, sample_rate),
            time_to_weight(release_ms, sample_rate),
        )
    }

    /// Recompute the weights for new time constants, keeping the level.
    pub fn set_times(&mut self, sample_rate: f32, attack_ms: f32, release_ms: f32) {
        let Self {
            attack_weight,
            release_weight,
            ..
        } = Self::with_times(sample_rate, attack_ms, release_ms);
        self.attack_weight = attack_weight;
        self.release_weight = release_weight;
    }

    /// Process one sample and return the updated envelope level.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let magnitude = input.abs();
        let weight = if magnitude > self.envelope {
            self.attack_weight
        } else {
            self.release_weight
        };
        self.envelope += (magnitude - self.envelope) * weight;
        if self.envelope < 1e-20 {
            self.envelope = 0.0;
        }
        self.envelope
    }

    /// Current envelope level without processing.
    #[inline]
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Reset the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

fn time_to_weight(time_ms: f32, sample_rate: f32) -> f32 {
    let samples = time_ms / 1000.0 * sample_rate;
    if samples <= 0.0 {
        1.0
    } else {
        1.0 - expf(-1.0 / samples)
    }
}
