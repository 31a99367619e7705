use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::{ConvolutionError, Convolver, DirectConvolver, validate_samples};

/// Zero-latency partitioned convolution.
///
/// The response is split at `partition_size` (B):
///
/// - **Head** `h[0..B)` runs through a [`DirectConvolver`], so every output
///   sample is available immediately.
/// - **Tail** `h[B..)` is cut into uniform partitions of B taps and convolved
///   with a uniformly partitioned overlap-save engine (FFT size 2B) and a
///   frequency-domain delay line. Each tail block is computed once B new
///   inputs have arrived and is played back during the next B samples,
///   which is exactly the B-sample offset of the tail within the response.
///
/// All FFT plans, spectra and scratch buffers are allocated in
/// [`new`](Self::new).
pub struct PartitionedConvolver {
    block: usize,
    ir_len: usize,
    head: DirectConvolver,
    /// Spectra of the tail partitions
    partitions: Vec<Vec<Complex<f32>>>,
    /// Spectra of past input frames, newest at `fdl_pos`
    fdl: Vec<Vec<Complex<f32>>>,
    fdl_pos: usize,
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    frame: Vec<Complex<f32>>,
    accum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    prev_input: Vec<f32>,
    input: Vec<f32>,
    tail_out: Vec<f32>,
    fill: usize,
}

impl PartitionedConvolver {
    /// Build a convolver for `ir` with partitions of `partition_size` taps.
    ///
    /// Powers of two give the fastest FFTs; 64 to 256 is a good range.
    pub fn new(ir: &[f32], partition_size: usize) -> Result<Self, ConvolutionError> {
        validate_samples(ir, 0)?;
        if partition_size == 0 {
            return Err(ConvolutionError::InvalidPartitionSize);
        }

        let block = partition_size;
        let fft_size = block * 2;
        let head = DirectConvolver::new(&ir[..ir.len().min(block)])?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let ifft = planner.plan_fft_inverse(fft_size);
        let scratch_len = fft
            .get_inplace_scratch_len()
            .max(ifft.get_inplace_scratch_len());
        let mut scratch = vec![Complex::new(0.0, 0.0); scratch_len];

        let tail = ir.get(block..).unwrap_or(&[]);
        let partitions: Vec<Vec<Complex<f32>>> = tail
            .chunks(block)
            .map(|segment| {
                let mut spectrum = vec![Complex::new(0.0, 0.0); fft_size];
                for (bin, &tap) in spectrum.iter_mut().zip(segment) {
                    *bin = Complex::new(tap, 0.0);
                }
                fft.process_with_scratch(&mut spectrum, &mut scratch);
                spectrum
            })
            .collect();

        let fdl = vec![vec![Complex::new(0.0, 0.0); fft_size]; partitions.len()];

        Ok(Self {
            block,
            ir_len: ir.len(),
            head,
            partitions,
            fdl,
            fdl_pos: 0,
            fft,
            ifft,
            frame: vec![Complex::new(0.0, 0.0); fft_size],
            accum: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
            prev_input: vec![0.0; block],
            input: vec![0.0; block],
            tail_out: vec![0.0; block],
            fill: 0,
        })
    }

    /// Partition size in samples.
    pub fn partition_size(&self) -> usize {
        self.block
    }

    /// Number of FFT partitions covering the tail.
    pub fn num_tail_partitions(&self) -> usize {
        self.partitions.len()
    }

    fn process_tail_block(&mut self) {
        let block = self.block;
        let count = self.partitions.len();

        // Overlap-save frame: previous block followed by the current one
        for (bin, &x) in self.frame.iter_mut().zip(self.prev_input.iter().chain(&self.input)) {
            *bin = Complex::new(x, 0.0);
        }
        self.fft.process_with_scratch(&mut self.frame, &mut self.scratch);

        self.fdl_pos = (self.fdl_pos + count - 1) % count;
        self.fdl[self.fdl_pos].copy_from_slice(&self.frame);

        self.accum.fill(Complex::new(0.0, 0.0));
        for (p, partition) in self.partitions.iter().enumerate() {
            let spectrum = &self.fdl[(self.fdl_pos + p) % count];
            for ((acc, x), h) in self.accum.iter_mut().zip(spectrum).zip(partition) {
                *acc += x * h;
            }
        }
        self.ifft.process_with_scratch(&mut self.accum, &mut self.scratch);

        let scale = 1.0 / (2 * block) as f32;
        for (out, bin) in self.tail_out.iter_mut().zip(&self.accum[block..]) {
            *out = bin.re * scale;
        }

        core::mem::swap(&mut self.prev_input, &mut self.input);
    }
}

impl Convolver for PartitionedConvolver {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let head = self.head.process(input);
        if self.partitions.is_empty() {
            return head;
        }

        let output = head + self.tail_out[self.fill];
        self.input[self.fill] = input;
        self.fill += 1;
        if self.fill == self.block {
            self.fill = 0;
            self.process_tail_block();
        }
        output
    }

    fn reset(&mut self) {
        self.head.reset();
        for spectrum in &mut self.fdl {
            spectrum.fill(Complex::new(0.0, 0.0));
        }
        self.fdl_pos = 0;
        self.prev_input.fill(0.0);
        self.input.fill(0.0);
        self.tail_out.fill(0.0);
        self.fill = 0;
    }

    fn ir_len(&self) -> usize {
        self.ir_len
    }
}

impl core::fmt::Debug for PartitionedConvolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PartitionedConvolver")
            .field("partition_size", &self.block)
            .field("ir_len", &self.ir_len)
            .field("tail_partitions", &self.partitions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random samples in [-1, 1).
    fn noise(len: usize, seed: u32) -> Vec<f32> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 8) as f32 / (1u32 << 23) as f32 - 1.0
            })
            .collect()
    }

    #[test]
    fn identity_is_passthrough() {
        let mut conv = PartitionedConvolver::new(&[1.0], 64).unwrap();
        assert_eq!(conv.num_tail_partitions(), 0);
        for x in noise(300, 7) {
            assert_eq!(conv.process(x), x);
        }
    }

    #[test]
    fn matches_direct_convolution() {
        let ir = noise(300, 1);
        let input = noise(1500, 2);

        let mut direct = DirectConvolver::new(&ir).unwrap();
        let mut partitioned = PartitionedConvolver::new(&ir, 32).unwrap();
        assert_eq!(partitioned.num_tail_partitions(), 9);

        for (i, &x) in input.iter().enumerate() {
            let expected = direct.process(x);
            let actual = partitioned.process(x);
            assert!(
                (expected - actual).abs() < 1e-3,
                "sample {i}: direct {expected}, partitioned {actual}"
            );
        }
    }

    #[test]
    fn zero_latency_impulse() {
        let mut ir = vec![0.0; 200];
        ir[0] = 0.5;
        ir[150] = 1.0;
        let mut conv = PartitionedConvolver::new(&ir, 64).unwrap();
        let mut block = vec![0.0; 256];
        block[0] = 1.0;
        conv.process_block(&mut block);

        assert!((block[0] - 0.5).abs() < 1e-6);
        assert!((block[150] - 1.0).abs() < 1e-5);
        assert!(block[151].abs() < 1e-5);
        assert_eq!(conv.latency_samples(), 0);
    }

    #[test]
    fn reset_clears_tail() {
        let ir = noise(400, 3);
        let mut conv = PartitionedConvolver::new(&ir, 64).unwrap();
        for x in noise(500, 4) {
            conv.process(x);
        }
        conv.reset();
        for _ in 0..600 {
            assert_eq!(conv.process(0.0), 0.0);
        }
    }

    #[test]
    fn rejects_zero_partition() {
        assert_eq!(
            PartitionedConvolver::new(&[1.0], 0).unwrap_err(),
            ConvolutionError::InvalidPartitionSize
        );
    }
}
