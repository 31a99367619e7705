//! Mathematical utility functions for amp DSP.
//!
//! Everything here is allocation-free and branch-light so it can run inside
//! the per-sample loops of the nonlinear chain.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! # Waveshaping
//!
//! Every saturating curve in the amp is built on [`fast_tanh`], a bounded,
//! odd-symmetric rational approximation of the hyperbolic tangent. Asymmetry
//! is never baked into the base function; it is introduced explicitly by
//! evaluating [`ClipCurve`]s with different scale factors per polarity:
//!
//! | Function | Character | Harmonics |
//! |----------|-----------|-----------|
//! | [`fast_tanh`] | Smooth, symmetric | Odd |
//! | [`asymmetric_clip`] | Tube-like, polarity dependent | Even + Odd |
//! | [`threshold_saturate`] | Linear until a knee, then soft | Odd, level dependent |
//!
//! # Utilities
//!
//! - [`wet_dry_mix`] - Exact dry/wet crossfade
//! - [`ms_to_samples`] - Time conversion
//! - [`flush_denormal`] - Subnormal guard for feedback paths

use libm::{expf, logf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use ampsim_core::db_to_linear;
///
/// assert_eq!(db_to_linear(0.0), 1.0);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Inputs at or below 1e-10 are clamped so silence maps to -200 dB instead of
/// negative infinity.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Fast bounded hyperbolic tangent approximation.
///
/// Uses the rational form `x·(27 + x²) / (27 + 9x²)`, which matches `tanh`
/// closely for `|x| < 3` and meets ±1 with zero slope at `|x| = 3`. Beyond that
/// the output is pinned to ±1.
///
/// Guarantees:
/// - `fast_tanh(0.0) == 0.0`
/// - odd symmetry: `fast_tanh(-x) == -fast_tanh(x)`
/// - monotonically non-decreasing
/// - `|fast_tanh(x)| <= 1.0` for every finite `x`, and ±∞ map to ±1
///
/// # Example
/// ```rust
/// use ampsim_core::fast_tanh;
///
/// assert_eq!(fast_tanh(0.0), 0.0);
/// assert_eq!(fast_tanh(10.0), 1.0);
/// assert_eq!(fast_tanh(-0.5), -fast_tanh(0.5));
/// ```
#[inline]
pub fn fast_tanh(x: f32) -> f32 {
    if x >= 3.0 {
        return 1.0;
    }
    if x <= -3.0 {
        return -1.0;
    }
    let x2 = x * x;
    // Rounding near the knee can land one ulp above unity.
    (x * (27.0 + x2) / (27.0 + 9.0 * x2)).clamp(-1.0, 1.0)
}

/// One polarity of an asymmetric saturator.
///
/// Evaluates `ceiling * fast_tanh(x * drive)`. `drive` sets how quickly the
/// curve bends (curvature), `ceiling` sets where it flattens out (threshold).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipCurve {
    /// Input scale applied before the saturator
    pub drive: f32,
    /// Output scale applied after the saturator
    pub ceiling: f32,
}

impl ClipCurve {
    /// Create a new clip curve.
    pub const fn new(drive: f32, ceiling: f32) -> Self {
        Self { drive, ceiling }
    }

    /// Apply the curve to one sample.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        self.ceiling * fast_tanh(x * self.drive)
    }
}

/// Asymmetric soft clipping.
///
/// Positive samples go through `positive`, negative samples through
/// `negative`. Giving the two polarities different drive/ceiling values
/// produces even-order harmonics, the signature of single-ended triode
/// stages.
///
/// # Example
/// ```rust
/// use ampsim_core::{ClipCurve, asymmetric_clip};
///
/// let soft = ClipCurve::new(1.0, 1.0);
/// let hard = ClipCurve::new(1.5, 0.8);
/// assert!(asymmetric_clip(5.0, soft, hard) > -asymmetric_clip(-5.0, soft, hard));
/// ```
#[inline]
pub fn asymmetric_clip(x: f32, positive: ClipCurve, negative: ClipCurve) -> f32 {
    if x >= 0.0 {
        positive.apply(x)
    } else {
        negative.apply(x)
    }
}

/// Saturate only above a magnitude threshold.
///
/// Samples with `|x| <= threshold` pass through untouched. Above the
/// threshold the excess is squeezed by [`fast_tanh`] into the remaining
/// `1.0 - threshold` of headroom, so the curve is continuous at the knee and
/// never exceeds ±1.
///
/// `threshold` must lie in `[0.0, 1.0)`.
#[inline]
pub fn threshold_saturate(x: f32, threshold: f32) -> f32 {
    let magnitude = x.abs();
    if magnitude <= threshold {
        return x;
    }
    let headroom = 1.0 - threshold;
    let shaped = threshold + headroom * fast_tanh((magnitude - threshold) / headroom);
    shaped.copysign(x)
}

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Convert milliseconds to (fractional) samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Values below 1e-20 are replaced with zero, leaving margin before the
/// IEEE 754 subnormal range where many CPUs slow down dramatically.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Crossfade between dry and wet signals.
///
/// Computed as `dry * (1 - mix) + wet * mix` so the end points are exact:
/// `mix == 0.0` returns `dry` bit-for-bit and `mix == 1.0` returns `wet`.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_linear_roundtrip() {
        let original = 0.5;
        let db = linear_to_db(original);
        let back = db_to_linear(db);
        assert!(
            (original - back).abs() < 1e-5,
            "Roundtrip failed: {} -> {} -> {}",
            original,
            db,
            back
        );
    }

    #[test]
    fn test_db_zero_is_exact_unity() {
        assert_eq!(db_to_linear(0.0), 1.0);
    }

    #[test]
    fn test_fast_tanh_fixed_points() {
        assert_eq!(fast_tanh(0.0), 0.0);
        assert_eq!(fast_tanh(3.0), 1.0);
        assert_eq!(fast_tanh(-3.0), -1.0);
        assert_eq!(fast_tanh(f32::INFINITY), 1.0);
        assert_eq!(fast_tanh(f32::NEG_INFINITY), -1.0);
        assert_eq!(fast_tanh(f32::MAX), 1.0);
    }

    #[test]
    fn test_fast_tanh_tracks_tanh() {
        for i in -300..=300 {
            let x = i as f32 * 0.01;
            let err = (fast_tanh(x) - libm::tanhf(x)).abs();
            assert!(err < 0.025, "x={x}: error {err}");
        }
    }

    #[test]
    fn test_fast_tanh_odd_symmetry() {
        for i in 0..1000 {
            let x = i as f32 * 0.007;
            assert_eq!(fast_tanh(-x), -fast_tanh(x));
        }
    }

    #[test]
    fn test_asymmetric_clip_polarity() {
        let pos = ClipCurve::new(0.8, 1.25);
        let neg = ClipCurve::new(1.2, 0.83);

        // Large excursions settle at each polarity's ceiling
        assert!((asymmetric_clip(100.0, pos, neg) - 1.25).abs() < 1e-6);
        assert!((asymmetric_clip(-100.0, pos, neg) + 0.83).abs() < 1e-6);
        assert_eq!(asymmetric_clip(0.0, pos, neg), 0.0);
    }

    #[test]
    fn test_threshold_saturate_linear_region() {
        for i in -70..=70 {
            let x = i as f32 * 0.01;
            assert_eq!(threshold_saturate(x, 0.7), x);
        }
    }

    #[test]
    fn test_threshold_saturate_bounded_and_continuous() {
        assert!(threshold_saturate(50.0, 0.7) <= 1.0);
        assert!(threshold_saturate(-50.0, 0.7) >= -1.0);

        let below = threshold_saturate(0.7, 0.7);
        let above = threshold_saturate(0.7001, 0.7);
        assert!((above - below).abs() < 1e-3);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
    }

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(ms_to_samples(10.0, 48000.0), 480.0);
    }

    #[test]
    fn test_wet_dry_mix_endpoints_exact() {
        let dry = 0.123_456_7;
        let wet = -0.987_654_3;
        assert_eq!(wet_dry_mix(dry, wet, 0.0), dry);
        assert_eq!(wet_dry_mix(dry, wet, 1.0), wet);
        assert!((wet_dry_mix(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1.0), 1.0);
        assert_eq!(flush_denormal(1e-10), 1e-10);
        assert_eq!(flush_denormal(1e-21), 0.0);
        assert_eq!(flush_denormal(-1e-38), 0.0);
    }
}
