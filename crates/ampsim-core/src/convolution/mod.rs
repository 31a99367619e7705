//! Finite impulse response convolution.
//!
//! Two engines share the [`Convolver`] contract:
//!
//! - [`DirectConvolver`] - Time-domain FIR, O(N) per sample. Exact, and the
//!   reference the partitioned engine is tested against.
//! - [`PartitionedConvolver`] - Zero-latency hybrid: the first partition runs
//!   in the time domain, the rest through a uniformly partitioned FFT engine.
//!
//! Both are mono; multichannel users keep one instance per channel. Both
//! return their input unchanged for the identity response (a single unit
//! sample at index 0).
//!
//! Impulse responses are validated once, when an [`ImpulseResponse`] or a
//! convolver is built. Processing never fails and never allocates.

mod direct;
mod partitioned;

pub use direct::DirectConvolver;
pub use partitioned::PartitionedConvolver;

use thiserror::Error;

/// Errors raised while building impulse responses or convolvers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvolutionError {
    /// No channels were supplied
    #[error("impulse response has no channels")]
    NoChannels,

    /// A channel contains no samples
    #[error("impulse response channel {channel} is empty")]
    Empty {
        /// Index of the empty channel.
        channel: usize,
    },

    /// A sample is NaN or infinite
    #[error("impulse response channel {channel} has a non-finite sample at index {index}")]
    NonFinite {
        /// Channel containing the sample.
        channel: usize,
        /// Sample index within the channel.
        index: usize,
    },

    /// Channels have different lengths
    #[error("impulse response channel {channel} has {found} samples, expected {expected}")]
    LengthMismatch {
        /// Channel with the odd length.
        channel: usize,
        /// Length of channel 0.
        expected: usize,
        /// Length of the offending channel.
        found: usize,
    },

    /// Partition size of zero
    #[error("partition size must be greater than zero")]
    InvalidPartitionSize,
}

/// Common interface of the convolution engines.
///
/// # Example
///
/// ```rust
/// use ampsim_core::{Convolver, DirectConvolver};
///
/// let mut conv = DirectConvolver::new(&[0.5, 0.25]).unwrap();
/// let mut block = [1.0, 0.0, 0.0];
/// conv.process_block(&mut block);
/// assert_eq!(block, [0.5, 0.25, 0.0]);
/// ```
pub trait Convolver: Send {
    /// Convolve one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Convolve a block in place.
    fn process_block(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear the input history without touching the response.
    fn reset(&mut self);

    /// Length of the loaded response in samples.
    fn ir_len(&self) -> usize;

    /// Delay added on top of the response itself. Default is 0.
    fn latency_samples(&self) -> usize {
        0
    }
}

/// An immutable, validated multichannel impulse response.
///
/// Every channel has the same non-zero length and only finite samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    channels: Vec<Vec<f32>>,
}

impl ImpulseResponse {
    /// Validate and wrap per-channel sample vectors.
    pub fn new(channels: Vec<Vec<f32>>) -> Result<Self, ConvolutionError> {
        let first = channels.first().ok_or(ConvolutionError::NoChannels)?;
        let expected = first.len();

        for (channel, samples) in channels.iter().enumerate() {
            validate_samples(samples, channel)?;
            if samples.len() != expected {
                return Err(ConvolutionError::LengthMismatch {
                    channel,
                    expected,
                    found: samples.len(),
                });
            }
        }

        Ok(Self { channels })
    }

    /// Single-channel response.
    pub fn mono(samples: Vec<f32>) -> Result<Self, ConvolutionError> {
        Self::new(vec![samples])
    }

    /// Unit impulse on every channel: convolution becomes a passthrough.
    ///
    /// # Panics
    ///
    /// Panics if `num_channels` is 0.
    pub fn identity(num_channels: usize) -> Self {
        assert!(num_channels > 0, "identity response needs at least one channel");
        Self {
            channels: vec![vec![1.0]; num_channels],
        }
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Length of each channel in samples.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Always `false`; validated responses hold at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Samples of `channel`. Indices past the last channel reuse the last
    /// one, so a mono response feeds any number of outputs.
    pub fn channel(&self, channel: usize) -> &[f32] {
        let last = self.channels.len() - 1;
        &self.channels[channel.min(last)]
    }

    /// Duration in seconds at `sample_rate`.
    pub fn duration_secs(&self, sample_rate: f64) -> f64 {
        self.len() as f64 / sample_rate
    }
}

pub(crate) fn validate_samples(samples: &[f32], channel: usize) -> Result<(), ConvolutionError> {
    if samples.is_empty() {
        return Err(ConvolutionError::Empty { channel });
    }
    if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
        return Err(ConvolutionError::NonFinite { channel, index });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_no_channels() {
        assert_eq!(ImpulseResponse::new(vec![]), Err(ConvolutionError::NoChannels));
    }

    #[test]
    fn rejects_empty_channel() {
        let err = ImpulseResponse::new(vec![vec![1.0], vec![]]).unwrap_err();
        assert_eq!(err, ConvolutionError::Empty { channel: 1 });
    }

    #[test]
    fn rejects_non_finite() {
        let err = ImpulseResponse::mono(vec![1.0, 0.5, f32::NAN]).unwrap_err();
        assert_eq!(err, ConvolutionError::NonFinite { channel: 0, index: 2 });
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = ImpulseResponse::new(vec![vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert_eq!(
            err,
            ConvolutionError::LengthMismatch {
                channel: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn channel_index_saturates() {
        let ir = ImpulseResponse::new(vec![vec![1.0, 0.0], vec![0.5, 0.5]]).unwrap();
        assert_eq!(ir.channel(1), &[0.5, 0.5]);
        assert_eq!(ir.channel(5), &[0.5, 0.5]);
        assert_eq!(ir.len(), 2);
        assert!(!ir.is_empty());
    }

    #[test]
    fn identity_shape() {
        let ir = ImpulseResponse::identity(2);
        assert_eq!(ir.num_channels(), 2);
        assert_eq!(ir.channel(0), &[1.0]);
        assert!((ir.duration_secs(48000.0) - 1.0 / 48000.0).abs() < 1e-12);
    }
}
