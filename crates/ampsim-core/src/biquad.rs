//! Biquad (bi-quadratic) filter design and state.
//!
//! Every tone-stack band, the DC blocker and the procedural cabinet filters
//! run the same second-order difference equation; only the coefficients
//! differ. Coefficients are produced by [`BiquadCoefficients::design`], a pure
//! function of `(kind, sample_rate, frequency, q, linear_gain)`, and loaded
//! into a [`Biquad`] which owns the per-channel history.
//!
//! Coefficient calculation uses the RBJ Audio EQ Cookbook formulas, evaluated
//! in `f64` and rounded once to `f32`.

use core::f64::consts::PI;
use libm::{cos, sin, sqrt};

use crate::math::flush_denormal;

/// Filter response selected when designing coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Boost/cut below the corner frequency.
    LowShelf,
    /// Bell boost/cut around the center frequency.
    Peaking,
    /// Boost/cut above the corner frequency.
    HighShelf,
    /// Second-order high-pass (gain ignored).
    HighPass,
    /// Second-order low-pass (gain ignored).
    LowPass,
}

impl FilterKind {
    /// Whether the linear gain argument affects this response.
    pub fn uses_gain(self) -> bool {
        matches!(self, Self::LowShelf | Self::Peaking | Self::HighShelf)
    }
}

/// Five normalized coefficients of a second-order IIR section.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward coefficient for x[n]
    pub b0: f32,
    /// Feedforward coefficient for x[n-1]
    pub b1: f32,
    /// Feedforward coefficient for x[n-2]
    pub b2: f32,
    /// Feedback coefficient for y[n-1]
    pub a1: f32,
    /// Feedback coefficient for y[n-2]
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Passthrough: `y[n] = x[n]`.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Design a section with the RBJ cookbook formulas.
    ///
    /// # Arguments
    ///
    /// * `kind` - Response type
    /// * `sample_rate` - Sample rate in Hz
    /// * `frequency` - Corner/center frequency in Hz, clamped below Nyquist
    /// * `q` - Quality factor
    /// * `linear_gain` - Linear amplitude gain of the shelf/peak (1.0 = 0 dB)
    ///
    /// Shelf and peaking sections with `linear_gain == 1.0` return
    /// [`IDENTITY`](Self::IDENTITY), so a centered tone control is exactly
    /// flat. The result depends only on the arguments, so identical inputs
    /// always give bit-identical coefficients.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ampsim_core::{BiquadCoefficients, FilterKind};
    ///
    /// let flat = BiquadCoefficients::design(FilterKind::Peaking, 48000.0, 800.0, 1.5, 1.0);
    /// assert_eq!(flat, BiquadCoefficients::IDENTITY);
    /// ```
    pub fn design(kind: FilterKind, sample_rate: f64, frequency: f32, q: f32, linear_gain: f32) -> Self {
        if kind.uses_gain() && linear_gain == 1.0 {
            return Self::IDENTITY;
        }

        let nyquist_guard = sample_rate * 0.499;
        let frequency = f64::from(frequency).min(nyquist_guard).max(1.0);
        let q = f64::from(q).max(1e-3);

        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_omega = cos(omega);
        let sin_omega = sin(omega);
        let alpha = sin_omega / (2.0 * q);

        let (b0, b1, b2, a0, a1, a2) = match kind {
            FilterKind::LowShelf => {
                let a = sqrt(f64::from(linear_gain.max(1e-6)));
                let two_sqrt_a_alpha = 2.0 * sqrt(a) * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
                    a * ((a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha),
                    (a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
                    (a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha,
                )
            }
            FilterKind::HighShelf => {
                let a = sqrt(f64::from(linear_gain.max(1e-6)));
                let two_sqrt_a_alpha = 2.0 * sqrt(a) * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
                    a * ((a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha),
                    (a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
                    (a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha,
                )
            }
            FilterKind::Peaking => {
                let a = sqrt(f64::from(linear_gain.max(1e-6)));
                (
                    1.0 + alpha * a,
                    -2.0 * cos_omega,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_omega,
                    1.0 - alpha / a,
                )
            }
            FilterKind::HighPass => (
                (1.0 + cos_omega) / 2.0,
                -(1.0 + cos_omega),
                (1.0 + cos_omega) / 2.0,
                1.0 + alpha,
                -2.0 * cos_omega,
                1.0 - alpha,
            ),
            FilterKind::LowPass => (
                (1.0 - cos_omega) / 2.0,
                1.0 - cos_omega,
                (1.0 - cos_omega) / 2.0,
                1.0 + alpha,
                -2.0 * cos_omega,
                1.0 - alpha,
            ),
        };

        let a0_inv = 1.0 / a0;
        Self {
            b0: (b0 * a0_inv) as f32,
            b1: (b1 * a0_inv) as f32,
            b2: (b2 * a0_inv) as f32,
            a1: (a1 * a0_inv) as f32,
            a2: (a2 * a0_inv) as f32,
        }
    }

    /// Magnitude response at `frequency` Hz.
    ///
    /// Evaluated in `f64`; used by tests and diagnostics, never per sample.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * f64::from(frequency) / sample_rate;
        let (c1, s1) = (cos(omega), sin(omega));
        let (c2, s2) = (cos(2.0 * omega), sin(2.0 * omega));
        let (b0, b1, b2) = (f64::from(self.b0), f64::from(self.b1), f64::from(self.b2));
        let (a1, a2) = (f64::from(self.a1), f64::from(self.a2));

        // H(e^jw) with z^-1 = cos(w) - j sin(w)
        let num_re = b0 + b1 * c1 + b2 * c2;
        let num_im = -(b1 * s1 + b2 * s2);
        let den_re = 1.0 + a1 * c1 + a2 * c2;
        let den_im = -(a1 * s1 + a2 * s2);

        sqrt((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im))
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Direct Form I biquad: coefficients plus one channel of history.
///
/// History (`x[n-1]`, `x[n-2]`, `y[n-1]`, `y[n-2]`) persists across blocks and
/// across coefficient changes; it is cleared only by [`clear`](Self::clear).
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoefficients,

    /// Input delay line: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output delay line: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    pub fn new() -> Self {
        Self::with_coefficients(BiquadCoefficients::IDENTITY)
    }

    /// Creates a biquad with the given coefficients and cleared history.
    pub fn with_coefficients(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Replaces the coefficients, keeping the history.
    #[inline]
    pub fn set_coefficients(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }

    /// Processes a single sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = flush_denormal(
            c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2,
        );

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the filter history without changing coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{db_to_linear, linear_to_db};

    const SR: f64 = 48000.0;

    #[test]
    fn test_design_is_deterministic() {
        for kind in [
            FilterKind::LowShelf,
            FilterKind::Peaking,
            FilterKind::HighShelf,
            FilterKind::HighPass,
            FilterKind::LowPass,
        ] {
            let a = BiquadCoefficients::design(kind, SR, 1234.5, 0.7, 2.5);
            let b = BiquadCoefficients::design(kind, SR, 1234.5, 0.7, 2.5);
            assert_eq!(a.b0.to_bits(), b.b0.to_bits());
            assert_eq!(a.b1.to_bits(), b.b1.to_bits());
            assert_eq!(a.b2.to_bits(), b.b2.to_bits());
            assert_eq!(a.a1.to_bits(), b.a1.to_bits());
            assert_eq!(a.a2.to_bits(), b.a2.to_bits());
        }
    }

    #[test]
    fn test_design_at_tiny_sample_rate_is_finite() {
        for kind in [FilterKind::LowShelf, FilterKind::Peaking, FilterKind::HighPass, FilterKind::LowPass] {
            for sample_rate in [0.5, 1.5] {
                let c = BiquadCoefficients::design(kind, sample_rate, 1000.0, 0.7, 2.0);
                for coeff in [c.b0, c.b1, c.b2, c.a1, c.a2] {
                    assert!(coeff.is_finite(), "{kind:?} at {sample_rate} Hz");
                }
            }
        }
    }

    #[test]
    fn test_unity_gain_is_identity() {
        for kind in [FilterKind::LowShelf, FilterKind::Peaking, FilterKind::HighShelf] {
            let c = BiquadCoefficients::design(kind, SR, 3000.0, 0.7, 1.0);
            assert_eq!(c, BiquadCoefficients::IDENTITY);
        }
    }

    #[test]
    fn test_low_shelf_boost() {
        let c = BiquadCoefficients::design(FilterKind::LowShelf, SR, 120.0, 0.7, db_to_linear(12.0));
        let low = linear_to_db(c.magnitude_at(20.0, SR) as f32);
        let high = linear_to_db(c.magnitude_at(10000.0, SR) as f32);
        assert!((low - 12.0).abs() < 0.5, "low shelf gain {low}");
        assert!(high.abs() < 0.2, "high band gain {high}");
    }

    #[test]
    fn test_high_shelf_cut() {
        let c = BiquadCoefficients::design(FilterKind::HighShelf, SR, 3000.0, 0.7, db_to_linear(-12.0));
        let low = linear_to_db(c.magnitude_at(50.0, SR) as f32);
        let high = linear_to_db(c.magnitude_at(20000.0, SR) as f32);
        assert!(low.abs() < 0.2, "low band gain {low}");
        assert!((high + 12.0).abs() < 0.6, "high shelf gain {high}");
    }

    #[test]
    fn test_peaking_center_gain() {
        let c = BiquadCoefficients::design(FilterKind::Peaking, SR, 800.0, 1.5, db_to_linear(6.0));
        let center = linear_to_db(c.magnitude_at(800.0, SR) as f32);
        assert!((center - 6.0).abs() < 0.05, "peak gain {center}");
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut filter = Biquad::with_coefficients(BiquadCoefficients::design(
            FilterKind::HighPass,
            SR,
            20.0,
            0.707,
            1.0,
        ));
        let mut output = 0.0;
        for _ in 0..48000 {
            output = filter.process(1.0);
        }
        assert!(output.abs() < 1e-3, "DC leaked: {output}");
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let c = BiquadCoefficients::design(FilterKind::LowPass, SR, 1000.0, 0.707, 1.0);
        assert!((c.magnitude_at(1.0, SR) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_identity_passthrough_and_clear() {
        let mut filter = Biquad::new();
        for i in 0..16 {
            let x = i as f32 * 0.1 - 0.8;
            assert_eq!(filter.process(x), x);
        }

        filter.set_coefficients(BiquadCoefficients::design(FilterKind::LowPass, SR, 500.0, 0.707, 1.0));
        filter.process(1.0);
        filter.clear();
        assert_eq!(filter.process(0.0), 0.0);
    }
}
