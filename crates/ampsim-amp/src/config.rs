//! Engine configuration: voicing, oversampling, cabinet and limiter.
//!
//! Changing any of these requires a new `prepare`, which
//! [`AmpEngine::set_config`](crate::AmpEngine::set_config) does for you.

use core::fmt;
use core::str::FromStr;

use ampsim_core::{ImpulseResponse, OversampleFactor};

use crate::error::EngineError;

/// Amplifier voicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Voicing {
    /// Two tube gain stages, sagging power amp and output transformer.
    #[default]
    Tube,
    /// Solid-state clean preamp with a bright shelf.
    Clean,
}

impl Voicing {
    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tube => "tube",
            Self::Clean => "clean",
        }
    }
}

impl fmt::Display for Voicing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Voicing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tube" => Ok(Self::Tube),
            "clean" => Ok(Self::Clean),
            other => Err(format!("unknown voicing '{other}' (expected tube or clean)")),
        }
    }
}

/// Loudspeaker cabinet model.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CabinetModel {
    /// No cabinet; the stage is a passthrough.
    None,
    /// Closed-back 4×12: tight low resonance, darker top.
    #[default]
    Closed4x12,
    /// Open-back 2×12: looser low end, more air.
    Open2x12,
    /// User-supplied response, used as-is.
    Custom(ImpulseResponse),
}

impl CabinetModel {
    /// Stable lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Closed4x12 => "closed-4x12",
            Self::Open2x12 => "open-2x12",
            Self::Custom(_) => "custom",
        }
    }

    /// Parse a built-in model name. `custom` is not accepted here.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Some(Self::None),
            "closed-4x12" | "closed" | "4x12" => Some(Self::Closed4x12),
            "open-2x12" | "open" | "2x12" => Some(Self::Open2x12),
            _ => None,
        }
    }
}

/// Everything fixed at prepare time.
#[derive(Debug, Clone, PartialEq)]
pub struct AmpConfig {
    /// Voicing of the tone stack and nonlinear chain
    pub voicing: Voicing,
    /// Oversampling around the nonlinear chain, `None` to run at base rate
    pub oversampling: Option<OversampleFactor>,
    /// Cabinet stage
    pub cabinet: CabinetModel,
    /// Final soft limiter
    pub limiter: bool,
}

impl AmpConfig {
    /// Full tube amp: 4× oversampling, closed 4×12 cabinet, limiter on.
    pub fn tube() -> Self {
        Self {
            voicing: Voicing::Tube,
            oversampling: Some(OversampleFactor::X4),
            cabinet: CabinetModel::Closed4x12,
            limiter: true,
        }
    }

    /// Reduced clean amp: no oversampling, no cabinet, limiter on.
    pub fn clean() -> Self {
        Self {
            voicing: Voicing::Clean,
            oversampling: None,
            cabinet: CabinetModel::None,
            limiter: true,
        }
    }

    /// Defaults for a voicing.
    pub fn for_voicing(voicing: Voicing) -> Self {
        match voicing {
            Voicing::Tube => Self::tube(),
            Voicing::Clean => Self::clean(),
        }
    }

    /// Replace the oversampling factor.
    pub fn with_oversampling(mut self, factor: Option<OversampleFactor>) -> Self {
        self.oversampling = factor;
        self
    }

    /// Replace the cabinet.
    pub fn with_cabinet(mut self, cabinet: CabinetModel) -> Self {
        self.cabinet = cabinet;
        self
    }

    /// Enable or disable the output limiter.
    pub fn with_limiter(mut self, limiter: bool) -> Self {
        self.limiter = limiter;
        self
    }

    /// Numeric oversampling factor, 1 when disabled.
    pub fn oversampling_factor(&self) -> usize {
        self.oversampling.map_or(1, OversampleFactor::factor)
    }
}

impl Default for AmpConfig {
    fn default() -> Self {
        Self::tube()
    }
}

/// Map a numeric factor to an oversampling setting: 1 disables it,
/// 2, 4 and 8 enable it.
pub fn oversampling_from_factor(factor: usize) -> Result<Option<OversampleFactor>, EngineError> {
    if factor == 1 {
        return Ok(None);
    }
    OversampleFactor::from_factor(factor)
        .map(Some)
        .ok_or(EngineError::InvalidOversampling(factor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tube_is_default() {
        let config = AmpConfig::default();
        assert_eq!(config.voicing, Voicing::Tube);
        assert_eq!(config.oversampling, Some(OversampleFactor::X4));
        assert_eq!(config.cabinet, CabinetModel::Closed4x12);
        assert!(config.limiter);
    }

    #[test]
    fn clean_disables_oversampling_and_cabinet() {
        let config = AmpConfig::clean();
        assert_eq!(config.oversampling, None);
        assert_eq!(config.oversampling_factor(), 1);
        assert_eq!(config.cabinet, CabinetModel::None);
        assert_eq!(AmpConfig::for_voicing(Voicing::Clean).cabinet, CabinetModel::None);
    }

    #[test]
    fn oversampling_factors() {
        assert_eq!(oversampling_from_factor(1).unwrap(), None);
        assert_eq!(oversampling_from_factor(8).unwrap(), Some(OversampleFactor::X8));
        assert!(matches!(
            oversampling_from_factor(3),
            Err(EngineError::InvalidOversampling(3))
        ));
    }

    #[test]
    fn builders() {
        let config = AmpConfig::tube()
            .with_oversampling(None)
            .with_cabinet(CabinetModel::None)
            .with_limiter(false);
        assert_eq!(config.oversampling_factor(), 1);
        assert_eq!(config.cabinet.name(), "none");
        assert!(!config.limiter);
    }

    #[test]
    fn names_parse() {
        assert_eq!("Clean".parse::<Voicing>(), Ok(Voicing::Clean));
        assert!("metal".parse::<Voicing>().is_err());
        assert_eq!(CabinetModel::from_name("open-2x12"), Some(CabinetModel::Open2x12));
        assert_eq!(CabinetModel::from_name("custom"), None);
    }
}
