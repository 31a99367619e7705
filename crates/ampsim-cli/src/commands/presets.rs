//! Preset listing and inspection.

use ampsim_config::{
    Preset, ensure_user_presets_dir, factory_presets, get_factory_preset, list_user_presets,
    preset_name_from_path, user_presets_dir,
};
use clap::Args;

use super::common::load_preset;

#[derive(Args)]
pub struct PresetsArgs {
    /// Show details of a preset (name or path)
    #[arg(long, value_name = "NAME", conflicts_with = "copy")]
    show: Option<String>,

    /// Copy a factory preset into the user presets directory
    #[arg(long, value_name = "NAME")]
    copy: Option<String>,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    if let Some(name) = &args.show {
        return show_preset(name);
    }
    if let Some(name) = &args.copy {
        return copy_preset(name);
    }
    list_presets();
    Ok(())
}

fn list_presets() {
    println!("Factory Presets:");
    println!("================");
    for preset in factory_presets() {
        let desc = preset.description.as_deref().unwrap_or("");
        println!("  {:20} - {}", preset.name, desc);
    }
    println!();

    println!("User Presets ({}):", user_presets_dir().display());
    println!("=============");
    let user_presets = list_user_presets();
    if user_presets.is_empty() {
        println!("  (none)");
    }
    for path in user_presets {
        let name = preset_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
        match Preset::load(&path) {
            Ok(preset) => {
                let desc = preset.description.as_deref().unwrap_or("");
                println!("  {name:20} - {desc}");
            }
            Err(e) => println!("  {name:20} - (error: {e})"),
        }
    }
}

fn show_preset(name: &str) -> anyhow::Result<()> {
    let preset = load_preset(name)?;
    let config = preset.to_amp_config()?;

    println!("Preset: {}", preset.name);
    println!("{}", "=".repeat(8 + preset.name.len()));
    if let Some(desc) = &preset.description {
        println!("{desc}");
    }
    println!();
    println!("  Voicing:      {}", config.voicing);
    println!("  Oversampling: {}x", config.oversampling_factor());
    println!("  Cabinet:      {}", config.cabinet.name());
    println!("  Limiter:      {}", if config.limiter { "on" } else { "off" });
    println!();
    println!("TOML:");
    println!("{}", preset.to_toml()?);
    Ok(())
}

fn copy_preset(name: &str) -> anyhow::Result<()> {
    let preset = get_factory_preset(name)
        .ok_or_else(|| anyhow::anyhow!("'{name}' is not a factory preset"))?;
    let file_name = name.to_lowercase().replace(' ', "-");
    let path = ensure_user_presets_dir()?.join(format!("{file_name}.toml"));
    anyhow::ensure!(!path.exists(), "{} already exists", path.display());

    preset.save(&path)?;
    println!("Copied '{}' to {}", preset.name, path.display());
    Ok(())
}
