//! Core Effect trait.
//!
//! The [`Effect`] trait is the common interface of every per-channel
//! processing stage in the amp: the nonlinear stages, the stage chain that
//! groups them, and the chorus voices.
//!
//! ## Design Decisions
//!
//! - **Mono processing**: Single `f32` input/output. Multichannel processors
//!   own one instance per channel so filter and envelope state never leaks
//!   between channels.
//!
//! - **Object-safe**: `dyn Effect` works, but the amp wires its stages with
//!   concrete types so the per-sample calls inline.
//!
//! - **No allocations**: All methods are designed to be called in real-time
//!   audio contexts with zero heap allocations.

/// Core trait for all per-channel audio stages.
///
/// # Example
///
/// ```rust
/// use ampsim_core::Effect;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut gain = Gain { gain: 0.5 };
/// let mut block = [1.0, -1.0];
/// gain.process_block_inplace(&mut block);
/// assert_eq!(block, [0.5, -0.5]);
/// ```
pub trait Effect {
    /// Process a single sample.
    ///
    /// For stages with internal state (filters, envelopes, delays) this
    /// advances the state by one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples.
    ///
    /// Default implementation calls `process()` for each sample.
    ///
    /// # Panics
    /// Debug builds panic if `input.len() != output.len()`.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a block of samples in-place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate the stage runs at.
    ///
    /// Stages inside the oversampler receive the oversampled rate.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear all internal state without touching parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Default is 0.
    fn latency_samples(&self) -> usize {
        0
    }
}
