//! Integration tests for ampsim-config.
//!
//! These tests exercise presets end to end: files on disk, engines built
//! from presets, and audio through the result.

use std::sync::Arc;

use ampsim_amp::{AmpConfig, AmpEngine, AmpParams, ParamId, Voicing};
use ampsim_config::{ConfigError, Preset, ValidationError, factory_presets, get_factory_preset};
use tempfile::TempDir;

fn render(engine: &mut AmpEngine, len: usize) -> Vec<f32> {
    let mut output: Vec<f32> = (0..len).map(|i| 0.5 * (i as f32 * 0.05).sin()).collect();
    for block in output.chunks_mut(256) {
        engine.process(&mut [block]);
    }
    output
}

/// Every factory preset builds an engine that produces bounded audio.
#[test]
fn factory_presets_process_audio() {
    for preset in factory_presets() {
        let mut engine = preset
            .build_engine()
            .unwrap_or_else(|e| panic!("{}: {e}", preset.name));
        engine.prepare(48000.0, 256, 1);

        let output = render(&mut engine, 4096);
        assert!(
            output.iter().all(|s| s.is_finite() && s.abs() <= 1.0),
            "{} out of bounds",
            preset.name
        );
        assert!(output.iter().any(|&s| s != 0.0), "{} is silent", preset.name);
    }
}

/// Save then load reproduces the preset, creating missing directories.
#[test]
fn save_load_cycle() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("dir").join("edge.toml");

    let preset = Preset::new("Edge")
        .with_description("Saved from a test")
        .with_voicing(Voicing::Tube)
        .with_oversampling(2)
        .with_param(ParamId::PreampGain, 0.6)
        .with_param(ParamId::ChorusEnabled, true);
    preset.save(&path).unwrap();
    assert!(path.exists());

    assert_eq!(Preset::load(&path).unwrap(), preset);
}

/// Loading a file that does not exist reports the path.
#[test]
fn load_missing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.toml");
    match Preset::load(&path) {
        Err(ConfigError::ReadFile { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected ReadFile, got {other:?}"),
    }
}

/// Malformed TOML surfaces as a parse error.
#[test]
fn load_malformed_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    std::fs::write(&path, "name = [unclosed").unwrap();
    assert!(matches!(Preset::load(&path), Err(ConfigError::TomlParse(_))));
}

/// Out-of-range values are rejected before touching the parameter store.
#[test]
fn invalid_preset_leaves_params_untouched() {
    let params = AmpParams::new();
    params.set(ParamId::Treble, 0.9);

    let preset = Preset::new("Loud").with_param(ParamId::MasterVolume, 2.0);
    let err = preset.apply(&params).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Validation(ValidationError::OutOfRange { .. })
    ));
    assert_eq!(params.get(ParamId::Treble), 0.9);
}

/// A preset applied to a running engine's shared store takes effect.
#[test]
fn apply_to_shared_params() {
    let params = Arc::new(AmpParams::new());
    let mut engine = AmpEngine::with_params(AmpConfig::tube(), Arc::clone(&params));
    engine.prepare(48000.0, 256, 1);

    get_factory_preset("lead").unwrap().apply(&params).unwrap();
    assert_eq!(engine.params().get(ParamId::Drive), 0.8);
    assert!(render(&mut engine, 1024).iter().all(|s| s.is_finite()));
}

/// Capturing an engine's state and rebuilding gives identical output.
#[test]
fn captured_preset_reproduces_engine() {
    let config = AmpConfig::clean();
    let params = AmpParams::for_voicing(Voicing::Clean);
    params.set(ParamId::Bright, 0.4);
    params.set(ParamId::ChorusDepth, 0.8);

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("captured.toml");
    Preset::capture("Captured", &config, &params).unwrap().save(&path).unwrap();

    let mut original = AmpEngine::with_params(config, Arc::new(params));
    original.prepare(48000.0, 256, 1);
    let mut rebuilt = Preset::load(&path).unwrap().build_engine().unwrap();
    rebuilt.prepare(48000.0, 256, 1);

    assert_eq!(render(&mut original, 4096), render(&mut rebuilt, 4096));
}
