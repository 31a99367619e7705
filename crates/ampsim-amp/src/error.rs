//! Error types for parameter parsing and engine setup.
//!
//! Nothing here is produced while audio is being processed; block
//! processing has no error path.

use ampsim_core::ConvolutionError;
use thiserror::Error;

/// Errors from parameter name parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// No parameter has this name
    #[error("unknown parameter '{0}'")]
    Unknown(String),
}

/// Errors from engine configuration and the checked prepare path.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Oversampling factor other than 1, 2, 4 or 8
    #[error("unsupported oversampling factor {0} (expected 1, 2, 4 or 8)")]
    InvalidOversampling(usize),

    /// Sample rate below `MIN_SAMPLE_RATE` or not finite
    #[error("invalid sample rate {0} Hz")]
    InvalidSampleRate(f64),

    /// Maximum block size of zero
    #[error("maximum block size must be greater than zero")]
    ZeroBlockSize,

    /// Channel count of zero
    #[error("channel count must be greater than zero")]
    ZeroChannels,

    /// The cabinet impulse response could not be loaded
    #[error("cabinet impulse response: {0}")]
    Cabinet(#[from] ConvolutionError),
}
