//! Shared CLI helpers used across multiple commands.

use ampsim_config::{Preset, find_preset, get_factory_preset};

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid parameter format: '{s}' (expected key=value)"))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Parse a normalized parameter value; `on`/`off`/`true`/`false` map to 1 and 0.
pub fn parse_param_value(s: &str) -> anyhow::Result<f32> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" => Ok(1.0),
        "off" | "false" => Ok(0.0),
        other => {
            let value: f32 = other
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid value '{s}' (expected 0..1, on or off)"))?;
            anyhow::ensure!(value.is_finite(), "invalid value '{s}'");
            Ok(value)
        }
    }
}

/// Load a preset by name: factory presets first, then user presets or a
/// file path.
pub fn load_preset(name: &str) -> anyhow::Result<Preset> {
    if let Some(preset) = get_factory_preset(name) {
        return Ok(preset);
    }

    if let Some(path) = find_preset(name) {
        return Ok(Preset::load(&path)?);
    }

    anyhow::bail!("preset '{name}' not found; run 'ampsim presets' to list available presets")
}
