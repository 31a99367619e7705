//! Presets and configuration for the ampsim amp engine.
//!
//! - **Presets**: [`Preset`] stores an engine configuration and parameter
//!   values as TOML
//! - **Validation**: every problem in a preset is reported before it reaches
//!   an engine
//! - **Paths**: platform-specific user preset directory
//! - **Factory Presets**: built-in starting points for both voicings
//!
//! # Example
//!
//! ```rust,no_run
//! use ampsim_amp::{ParamId, Voicing};
//! use ampsim_config::{Preset, get_factory_preset, user_presets_dir};
//!
//! let mut engine = get_factory_preset("crunch").unwrap().build_engine().unwrap();
//! engine.prepare(48000.0, 256, 2);
//!
//! let preset = Preset::new("Sparkle")
//!     .with_voicing(Voicing::Clean)
//!     .with_param(ParamId::Bright, 0.8);
//! preset.save(user_presets_dir().join("sparkle.toml")).unwrap();
//! ```

mod error;
mod preset;

/// Platform-specific preset locations.
pub mod paths;

/// Preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use paths::{
    ensure_user_presets_dir, find_preset, list_user_presets, preset_name_from_path,
    user_presets_dir,
};
pub use preset::{EngineSection, ParamValue, Preset};
pub use validation::{ValidationError, ValidationResult, validate_param, validate_preset};
