//! Preset file format and operations.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use ampsim_amp::{
    AmpConfig, AmpEngine, AmpParams, CabinetModel, ParamId, Voicing, oversampling_from_factor,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{ValidationError, validate_preset};

/// A stored parameter value: a normalized number or an on/off switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// On/off switch
    Switch(bool),
    /// Normalized value in `[0, 1]`
    Value(f32),
}

impl ParamValue {
    /// Normalized form; switches map to 0.0 or 1.0.
    pub fn normalized(self) -> f32 {
        match self {
            Self::Switch(on) => {
                if on {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Value(v) => v,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Value(v)
    }
}

impl From<bool> for ParamValue {
    fn from(on: bool) -> Self {
        Self::Switch(on)
    }
}

/// The `[engine]` table: everything fixed at prepare time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSection {
    /// `tube` or `clean`
    #[serde(default = "default_voicing")]
    pub voicing: String,

    /// 1, 2, 4 or 8; omitted means the voicing default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oversampling: Option<usize>,

    /// `none`, `closed-4x12` or `open-2x12`; omitted means the voicing
    /// default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cabinet: Option<String>,

    /// Final soft limiter.
    #[serde(default = "default_limiter")]
    pub limiter: bool,
}

fn default_voicing() -> String {
    Voicing::Tube.name().to_string()
}

fn default_limiter() -> bool {
    true
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            voicing: default_voicing(),
            oversampling: None,
            cabinet: None,
            limiter: true,
        }
    }
}

/// Amp preset: engine configuration plus parameter values.
///
/// # TOML Format
///
/// ```toml
/// name = "Crunch"
/// description = "Edge of breakup"
///
/// [engine]
/// voicing = "tube"
/// oversampling = 4
/// cabinet = "closed-4x12"
/// limiter = true
///
/// [params]
/// preamp_gain = 0.55
/// drive = 0.4
/// chorus_enabled = false
/// ```
///
/// Parameters left out keep the voicing defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Engine configuration.
    #[serde(default)]
    pub engine: EngineSection,

    /// Parameter id to value.
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

impl Preset {
    /// Create an empty tube preset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            engine: EngineSection::default(),
            params: BTreeMap::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the voicing.
    pub fn with_voicing(mut self, voicing: Voicing) -> Self {
        self.engine.voicing = voicing.name().to_string();
        self
    }

    /// Set the oversampling factor.
    pub fn with_oversampling(mut self, factor: usize) -> Self {
        self.engine.oversampling = Some(factor);
        self
    }

    /// Set a parameter value.
    pub fn with_param(mut self, id: ParamId, value: impl Into<ParamValue>) -> Self {
        self.params.insert(id.name().to_string(), value.into());
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), name = %preset.name, "loaded preset");
        Ok(preset)
    }

    /// Parse a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), name = %self.name, "saved preset");
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parsed voicing.
    pub fn voicing(&self) -> Result<Voicing, ConfigError> {
        self.engine
            .voicing
            .parse()
            .map_err(|_| ValidationError::UnknownVoicing(self.engine.voicing.clone()).into())
    }

    /// Build the engine configuration described by the `[engine]` table.
    pub fn to_amp_config(&self) -> Result<AmpConfig, ConfigError> {
        validate_preset(self)?;
        let mut config = AmpConfig::for_voicing(self.voicing()?);
        if let Some(factor) = self.engine.oversampling {
            config.oversampling = oversampling_from_factor(factor)?;
        }
        if let Some(name) = &self.engine.cabinet {
            config.cabinet = CabinetModel::from_name(name)
                .ok_or_else(|| ValidationError::UnknownCabinet(name.clone()))?;
        }
        config.limiter = self.engine.limiter;
        Ok(config)
    }

    /// Load the voicing defaults into `params`, then this preset's values.
    pub fn apply(&self, params: &AmpParams) -> Result<(), ConfigError> {
        validate_preset(self)?;
        let defaults = AmpParams::for_voicing(self.voicing()?);
        for id in ParamId::ALL {
            params.set(id, defaults.get(id));
        }
        for (name, value) in &self.params {
            params
                .set_by_name(name, value.normalized())
                .map_err(|_| ValidationError::UnknownParameter(name.clone()))?;
        }
        Ok(())
    }

    /// Unprepared engine configured and parameterized by this preset.
    pub fn build_engine(&self) -> Result<AmpEngine, ConfigError> {
        let config = self.to_amp_config()?;
        let params = Arc::new(AmpParams::new());
        self.apply(&params)?;
        Ok(AmpEngine::with_params(config, params))
    }

    /// Capture a configuration and every parameter value.
    ///
    /// Custom cabinet responses can not be stored and are rejected.
    pub fn capture(
        name: impl Into<String>,
        config: &AmpConfig,
        params: &AmpParams,
    ) -> Result<Self, ConfigError> {
        if let CabinetModel::Custom(_) = config.cabinet {
            return Err(ConfigError::Unrepresentable(
                "custom cabinet impulse responses".to_string(),
            ));
        }

        let snapshot = params.snapshot();
        let values = ParamId::ALL
            .into_iter()
            .map(|id| {
                let value = if id.is_switch() {
                    ParamValue::Switch(snapshot.is_on(id))
                } else {
                    ParamValue::Value(snapshot.get(id))
                };
                (id.name().to_string(), value)
            })
            .collect();

        Ok(Self {
            name: name.into(),
            description: None,
            engine: EngineSection {
                voicing: config.voicing.name().to_string(),
                oversampling: Some(config.oversampling_factor()),
                cabinet: Some(config.cabinet.name().to_string()),
                limiter: config.limiter,
            },
            params: values,
        })
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampsim_core::OversampleFactor;

    #[test]
    fn minimal_toml_uses_defaults() {
        let preset = Preset::from_toml(r#"name = "Bare""#).unwrap();
        assert_eq!(preset.engine, EngineSection::default());
        assert!(preset.params.is_empty());
        assert_eq!(preset.to_amp_config().unwrap(), AmpConfig::tube());
    }

    #[test]
    fn parses_mixed_param_types() {
        let preset = Preset::from_toml(
            r#"
name = "Mixed"

[params]
drive = 0.75
bass = 1
chorus_enabled = true
"#,
        )
        .unwrap();
        assert_eq!(preset.params["drive"], ParamValue::Value(0.75));
        assert_eq!(preset.params["bass"], ParamValue::Value(1.0));
        assert_eq!(preset.params["chorus_enabled"], ParamValue::Switch(true));
    }

    #[test]
    fn engine_section_overrides_voicing_defaults() {
        let preset = Preset::from_toml(
            r#"
name = "Clean X2"

[engine]
voicing = "clean"
oversampling = 2
cabinet = "none"
limiter = false
"#,
        )
        .unwrap();
        let config = preset.to_amp_config().unwrap();
        assert_eq!(config.voicing, Voicing::Clean);
        assert_eq!(config.oversampling, Some(OversampleFactor::X2));
        assert_eq!(config.cabinet, CabinetModel::None);
        assert!(!config.limiter);
    }

    #[test]
    fn bad_oversampling_is_rejected() {
        let preset = Preset::new("Bad").with_oversampling(3);
        assert!(preset.to_amp_config().is_err());
    }

    #[test]
    fn apply_resets_unlisted_params() {
        let params = AmpParams::new();
        params.set(ParamId::Treble, 0.9);
        Preset::new("Drive only")
            .with_param(ParamId::Drive, 0.8)
            .apply(&params)
            .unwrap();
        assert_eq!(params.get(ParamId::Drive), 0.8);
        assert_eq!(params.get(ParamId::Treble), 0.5);
    }

    #[test]
    fn clean_preset_keeps_chorus_default() {
        let params = AmpParams::new();
        Preset::new("JC").with_voicing(Voicing::Clean).apply(&params).unwrap();
        assert!(params.snapshot().chorus_enabled());
    }

    #[test]
    fn capture_then_apply_restores_values() {
        let params = AmpParams::new();
        params.set(ParamId::Middle, 0.3);
        params.set_switch(ParamId::ChorusEnabled, true);
        let preset = Preset::capture("Snapshot", &AmpConfig::clean(), &params).unwrap();
        assert_eq!(preset.params["chorus_enabled"], ParamValue::Switch(true));

        let restored = AmpParams::new();
        preset.apply(&restored).unwrap();
        assert_eq!(restored.snapshot(), params.snapshot());
        assert_eq!(preset.to_amp_config().unwrap(), AmpConfig::clean());
    }

    #[test]
    fn capture_rejects_custom_cabinet() {
        let config = AmpConfig::tube()
            .with_cabinet(CabinetModel::Custom(ampsim_core::ImpulseResponse::identity(1)));
        assert!(matches!(
            Preset::capture("x", &config, &AmpParams::new()),
            Err(ConfigError::Unrepresentable(_))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let preset = Preset::new("Round")
            .with_description("trip")
            .with_voicing(Voicing::Clean)
            .with_param(ParamId::ChorusMix, 0.25)
            .with_param(ParamId::ChorusEnabled, false);
        let text = preset.to_toml().unwrap();
        assert!(text.contains("[params]"));
        assert_eq!(Preset::from_toml(&text).unwrap(), preset);
    }
}
