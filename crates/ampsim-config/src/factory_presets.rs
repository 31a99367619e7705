//! Factory presets bundled with the library.
//!
//! Always available without external files; each is a starting point for
//! one of the two voicings.

use crate::Preset;

/// Identifiers of the factory presets, in listing order.
pub static FACTORY_PRESET_NAMES: &[&str] = &["clean", "crunch", "lead", "jazz-chorus", "bass-di"];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("clean", CLEAN_PRESET),
    ("crunch", CRUNCH_PRESET),
    ("lead", LEAD_PRESET),
    ("jazz-chorus", JAZZ_CHORUS_PRESET),
    ("bass-di", BASS_DI_PRESET),
];

const CLEAN_PRESET: &str = r#"
name = "Clean"
description = "Tube voicing below breakup"

[engine]
voicing = "tube"
oversampling = 4
cabinet = "open-2x12"

[params]
preamp_gain = 0.15
drive = 0.0
bass = 0.55
middle = 0.5
treble = 0.55
presence = 0.5
master_volume = 0.7
chorus_enabled = false
"#;

const CRUNCH_PRESET: &str = r#"
name = "Crunch"
description = "Edge of breakup rhythm tone"

[engine]
voicing = "tube"
oversampling = 4
cabinet = "closed-4x12"

[params]
preamp_gain = 0.55
drive = 0.35
bass = 0.55
middle = 0.6
treble = 0.55
presence = 0.6
master_volume = 0.65
chorus_enabled = false
"#;

const LEAD_PRESET: &str = r#"
name = "Lead"
description = "Saturated lead with a mid push"

[engine]
voicing = "tube"
oversampling = 8
cabinet = "closed-4x12"

[params]
preamp_gain = 0.85
drive = 0.8
bass = 0.5
middle = 0.7
treble = 0.5
presence = 0.65
master_volume = 0.6
chorus_enabled = false
"#;

const JAZZ_CHORUS_PRESET: &str = r#"
name = "Jazz Chorus"
description = "Clean voicing with stereo chorus"

[engine]
voicing = "clean"
cabinet = "open-2x12"

[params]
bass = 0.55
middle = 0.45
treble = 0.6
bright = 0.5
master_volume = 0.7
chorus_rate = 0.3
chorus_depth = 0.6
chorus_mix = 0.5
chorus_enabled = true
"#;

const BASS_DI_PRESET: &str = r#"
name = "Bass DI"
description = "Clean low end straight to the desk, no cabinet"

[engine]
voicing = "clean"
cabinet = "none"

[params]
bass = 0.65
middle = 0.5
treble = 0.4
bright = 0.0
master_volume = 0.75
chorus_enabled = false
"#;

/// Every factory preset, in listing order.
///
/// ```rust
/// use ampsim_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("{}: {}", preset.name, preset.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by identifier or display name, case-insensitively.
///
/// ```rust
/// use ampsim_config::get_factory_preset;
///
/// assert_eq!(get_factory_preset("Jazz Chorus").unwrap().name, "Jazz Chorus");
/// assert!(get_factory_preset("jazz-chorus").is_some());
/// ```
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();

    for (preset_name, toml) in FACTORY_PRESETS_TOML {
        if preset_name.to_lowercase() == name_lower {
            return Preset::from_toml(toml).ok();
        }
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.to_lowercase() == name_lower)
}

/// Identifiers of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Whether `name` matches a factory preset identifier or display name.
///
/// ```rust
/// use ampsim_config::is_factory_preset;
///
/// assert!(is_factory_preset("Crunch"));
/// assert!(!is_factory_preset("my_custom_preset"));
/// ```
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_preset;
    use ampsim_amp::{AmpParams, CabinetModel, ParamId, Voicing};

    #[test]
    fn all_factory_presets_parse() {
        assert_eq!(factory_presets().len(), FACTORY_PRESETS_TOML.len());
        assert_eq!(FACTORY_PRESET_NAMES, factory_preset_names().as_slice());
    }

    #[test]
    fn all_factory_presets_valid() {
        for preset in factory_presets() {
            validate_preset(&preset).unwrap_or_else(|e| panic!("{}: {e}", preset.name));
            preset
                .to_amp_config()
                .unwrap_or_else(|e| panic!("{}: {e}", preset.name));
        }
    }

    #[test]
    fn lookup_by_id_and_display_name() {
        assert_eq!(get_factory_preset("LEAD").unwrap().name, "Lead");
        assert_eq!(get_factory_preset("bass di").unwrap().name, "Bass DI");
        assert!(get_factory_preset("nonexistent").is_none());
        assert!(is_factory_preset("bass-di"));
        assert!(!is_factory_preset("metal"));
    }

    #[test]
    fn jazz_chorus_is_clean_with_chorus() {
        let preset = get_factory_preset("jazz-chorus").unwrap();
        assert_eq!(preset.voicing().unwrap(), Voicing::Clean);
        let params = AmpParams::new();
        preset.apply(&params).unwrap();
        assert!(params.snapshot().chorus_enabled());
        assert_eq!(params.get(ParamId::ChorusMix), 0.5);
    }

    #[test]
    fn bass_di_has_no_cabinet() {
        let config = get_factory_preset("bass-di").unwrap().to_amp_config().unwrap();
        assert_eq!(config.cabinet, CabinetModel::None);
        assert_eq!(config.oversampling, None);
    }
}
