//! Input stages: the triode preamp and the solid-state clean preamp.

use ampsim_core::{ClipCurve, Effect, SmoothedParam, asymmetric_clip, fast_tanh};

/// Positive half: gentle bend, full-scale ceiling.
const TRIODE_POSITIVE: ClipCurve = ClipCurve::new(1.0, 1.0);
/// Negative half: steeper bend, lower ceiling (grid conduction side).
const TRIODE_NEGATIVE: ClipCurve = ClipCurve::new(1.5, 0.8);

const GAIN_SMOOTHING_MS: f32 = 10.0;

/// Triode gain stage.
///
/// Multiplies by the smoothed preamp gain, then clips the two polarities
/// with different curves. The asymmetry adds even harmonics.
///
/// # Example
///
/// ```rust
/// use ampsim_amp::stages::Preamp;
/// use ampsim_core::Effect;
///
/// let mut preamp = Preamp::new(192_000.0);
/// preamp.set_gain(20.0);
/// preamp.snap();
/// let up = preamp.process(1.0);
/// let down = preamp.process(-1.0);
/// assert!(up > -down);
/// ```
#[derive(Debug, Clone)]
pub struct Preamp {
    gain: SmoothedParam,
}

impl Preamp {
    /// Unity-gain preamp at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            gain: SmoothedParam::with_config(1.0, sample_rate, GAIN_SMOOTHING_MS),
        }
    }

    /// Target gain multiplier.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain.set_target(gain);
    }

    /// Jump to the target gain.
    pub fn snap(&mut self) {
        self.gain.snap_to_target();
    }
}

impl Effect for Preamp {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let gain = self.gain.advance();
        asymmetric_clip(input * gain, TRIODE_POSITIVE, TRIODE_NEGATIVE)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.gain.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.gain.snap_to_target();
    }
}

const CLEAN_INPUT_GAIN: f32 = 1.2;
const CLEAN_KNEE: f32 = 0.8;
/// Distance from the knee to the ceiling.
const CLEAN_HEADROOM: f32 = 0.35;
/// Slope just above the knee.
const CLEAN_KNEE_SLOPE: f32 = 0.5;

/// Solid-state clean preamp.
///
/// Fixed 1.2× gain, linear up to 0.8, then a soft knee that starts at half
/// slope and levels off at 1.15. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanPreamp;

impl CleanPreamp {
    /// Create the stage.
    pub fn new() -> Self {
        Self
    }

    /// Output ceiling.
    pub const CEILING: f32 = CLEAN_KNEE + CLEAN_HEADROOM;
}

impl Effect for CleanPreamp {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let x = input * CLEAN_INPUT_GAIN;
        let magnitude = x.abs();
        if magnitude <= CLEAN_KNEE {
            return x;
        }
        let excess = (magnitude - CLEAN_KNEE) * CLEAN_KNEE_SLOPE / CLEAN_HEADROOM;
        (CLEAN_KNEE + CLEAN_HEADROOM * fast_tanh(excess)).copysign(x)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamp_is_asymmetric_and_bounded() {
        let mut preamp = Preamp::new(48000.0);
        preamp.set_gain(20.0);
        preamp.snap();
        assert_eq!(preamp.process(0.0), 0.0);
        let pos = preamp.process(10.0);
        let neg = preamp.process(-10.0);
        assert!(pos <= 1.0 && pos > 0.99);
        assert!((neg + 0.8).abs() < 1e-6);
    }

    #[test]
    fn preamp_gain_is_smoothed() {
        let mut preamp = Preamp::new(48000.0);
        preamp.set_gain(10.0);
        let first = preamp.process(0.01);
        assert!(first < 0.05, "gain jumped: {first}");
        for _ in 0..48000 {
            preamp.process(0.0);
        }
        let settled = preamp.process(0.01);
        assert!((settled - fast_tanh(0.1)).abs() < 1e-4);
    }

    #[test]
    fn clean_linear_below_knee() {
        let mut clean = CleanPreamp::new();
        assert_eq!(clean.process(0.5), 0.5 * CLEAN_INPUT_GAIN);
        assert_eq!(clean.process(-0.5), -0.5 * CLEAN_INPUT_GAIN);
    }

    #[test]
    fn clean_soft_knee_is_continuous_and_bounded() {
        let mut clean = CleanPreamp::new();
        let knee_in = CLEAN_KNEE / CLEAN_INPUT_GAIN;
        let below = clean.process(knee_in - 1e-4);
        let above = clean.process(knee_in + 1e-4);
        assert!((above - below).abs() < 1e-3);
        let loud = clean.process(1000.0);
        assert!(loud <= CleanPreamp::CEILING && loud > 1.1);
        assert_eq!(clean.process(-1000.0), -loud);
    }
}
