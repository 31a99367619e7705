//! Output transformer saturation.

use ampsim_core::{Effect, threshold_saturate};

/// Level below which the transformer is linear.
const CORE_THRESHOLD: f32 = 0.7;
const WARMTH: f32 = 0.05;

/// Output transformer.
///
/// Linear below 0.7, saturating above, plus a small `y·|y|` term.
/// Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputTransformer;

impl OutputTransformer {
    /// Create the stage.
    pub fn new() -> Self {
        Self
    }
}

impl Effect for OutputTransformer {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let y = threshold_saturate(input, CORE_THRESHOLD);
        y + WARMTH * y * y.abs()
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_signals_only_get_warmth() {
        let mut t = OutputTransformer::new();
        let x = 0.2f32;
        assert_eq!(t.process(x), x + WARMTH * x * x);
        assert_eq!(t.process(-x), -(x + WARMTH * x * x));
    }

    #[test]
    fn large_signals_saturate() {
        let mut t = OutputTransformer::new();
        let y = t.process(50.0);
        assert!(y <= 1.0 + WARMTH && y > 1.0);
        assert!(t.process(0.0) == 0.0);
    }
}
