//! Preset validation.
//!
//! Checks engine settings and parameter entries before anything touches
//! an engine, collecting every problem instead of stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use ampsim_config::{Preset, validate_preset};
//! use ampsim_amp::ParamId;
//!
//! let preset = Preset::new("Ok").with_param(ParamId::Drive, 0.4);
//! assert!(validate_preset(&preset).is_ok());
//!
//! let bad = Preset::new("Bad").with_param(ParamId::Drive, 1.5);
//! assert!(validate_preset(&bad).is_err());
//! ```

use ampsim_amp::{CabinetModel, ParamId, Voicing, oversampling_from_factor};
use thiserror::Error;

use crate::preset::{ParamValue, Preset};

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Unknown voicing name.
    #[error("unknown voicing: {0}")]
    UnknownVoicing(String),

    /// Unknown cabinet model name.
    #[error("unknown cabinet: {0}")]
    UnknownCabinet(String),

    /// Oversampling factor other than 1, 2, 4 or 8.
    #[error("invalid oversampling factor {0} (expected 1, 2, 4 or 8)")]
    InvalidOversampling(usize),

    /// Unknown parameter name.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [0, 1]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f32,
    },

    /// NaN or infinite value.
    #[error("parameter '{0}' is not a finite number")]
    NonFinite(String),

    /// A continuous parameter was given a boolean.
    #[error("parameter '{0}' expects a number, got a boolean")]
    TypeMismatch(String),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a single parameter entry and resolve its id.
///
/// Switches accept either a boolean or a number; continuous parameters
/// accept only numbers.
pub fn validate_param(name: &str, value: ParamValue) -> ValidationResult<ParamId> {
    let id: ParamId = name
        .parse()
        .map_err(|_| ValidationError::UnknownParameter(name.to_string()))?;

    match value {
        ParamValue::Switch(_) if !id.is_switch() => {
            Err(ValidationError::TypeMismatch(name.to_string()))
        }
        ParamValue::Switch(_) => Ok(id),
        ParamValue::Value(v) if !v.is_finite() => Err(ValidationError::NonFinite(name.to_string())),
        ParamValue::Value(v) if !(0.0..=1.0).contains(&v) => Err(ValidationError::OutOfRange {
            param: name.to_string(),
            value: v,
        }),
        ParamValue::Value(_) => Ok(id),
    }
}

/// Validate a whole preset.
///
/// A single problem is returned as is; several are wrapped in
/// [`ValidationError::Multiple`].
pub fn validate_preset(preset: &Preset) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if preset.engine.voicing.parse::<Voicing>().is_err() {
        errors.push(ValidationError::UnknownVoicing(preset.engine.voicing.clone()));
    }
    if let Some(factor) = preset.engine.oversampling
        && oversampling_from_factor(factor).is_err()
    {
        errors.push(ValidationError::InvalidOversampling(factor));
    }
    if let Some(name) = &preset.engine.cabinet
        && CabinetModel::from_name(name).is_none()
    {
        errors.push(ValidationError::UnknownCabinet(name.clone()));
    }
    for (name, &value) in &preset.params {
        if let Err(e) = validate_param(name, value) {
            errors.push(e);
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
