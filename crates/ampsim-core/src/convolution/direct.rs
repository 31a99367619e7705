use super::{ConvolutionError, Convolver, validate_samples};

/// Time-domain FIR convolution.
///
/// Keeps a mirrored circular history of the last `ir_len` inputs so each
/// output is one contiguous dot product:
///
/// ```text
/// y[n] = Σ h[j] · x[n - j]
/// ```
#[derive(Debug, Clone)]
pub struct DirectConvolver {
    kernel: Vec<f32>,
    /// Input history, newest first from `pos`, stored twice back to back
    history: Vec<f32>,
    pos: usize,
}

impl DirectConvolver {
    /// Build a convolver for `ir`.
    pub fn new(ir: &[f32]) -> Result<Self, ConvolutionError> {
        validate_samples(ir, 0)?;
        Ok(Self {
            kernel: ir.to_vec(),
            history: vec![0.0; ir.len() * 2],
            pos: 0,
        })
    }
}

impl Convolver for DirectConvolver {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let len = self.kernel.len();
        self.pos = if self.pos == 0 { len - 1 } else { self.pos - 1 };
        self.history[self.pos] = input;
        self.history[self.pos + len] = input;

        self.kernel
            .iter()
            .zip(&self.history[self.pos..self.pos + len])
            .map(|(h, x)| h * x)
            .sum()
    }

    fn reset(&mut self) {
        self.history.fill(0.0);
        self.pos = 0;
    }

    fn ir_len(&self) -> usize {
        self.kernel.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_passthrough() {
        let mut conv = DirectConvolver::new(&[1.0]).unwrap();
        for i in 0..100 {
            let x = (i as f32 * 0.37).sin();
            assert_eq!(conv.process(x), x);
        }
    }

    #[test]
    fn impulse_reproduces_response() {
        let ir = [0.5, -0.25, 0.125, 0.0, 1.0];
        let mut conv = DirectConvolver::new(&ir).unwrap();
        let mut block = [0.0; 8];
        block[0] = 1.0;
        conv.process_block(&mut block);
        assert_eq!(&block[..5], &ir);
        assert_eq!(&block[5..], &[0.0; 3]);
    }

    #[test]
    fn superposition() {
        let mut conv = DirectConvolver::new(&[1.0, 1.0]).unwrap();
        assert_eq!(conv.process(1.0), 1.0);
        assert_eq!(conv.process(2.0), 3.0);
        assert_eq!(conv.process(0.0), 2.0);
    }

    #[test]
    fn reset_clears_history() {
        let mut conv = DirectConvolver::new(&[0.0, 1.0]).unwrap();
        conv.process(1.0);
        conv.reset();
        assert_eq!(conv.process(0.0), 0.0);
    }

    #[test]
    fn rejects_invalid_response() {
        assert!(DirectConvolver::new(&[]).is_err());
        assert!(DirectConvolver::new(&[f32::INFINITY]).is_err());
    }
}
