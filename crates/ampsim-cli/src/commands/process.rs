//! Offline WAV rendering through the amp engine.

use std::path::PathBuf;
use std::sync::Arc;

use ampsim_amp::{AmpEngine, AmpParams, CabinetModel, Voicing, oversampling_from_factor};
use ampsim_config::{ParamValue, Preset, validate_param};
use ampsim_core::linear_to_db;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use super::common::{load_preset, parse_key_val, parse_param_value};
use crate::wav::{Audio, read_wav, write_wav};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Factory or user preset name
    #[arg(short, long, conflicts_with = "preset_file")]
    preset: Option<String>,

    /// Preset file (TOML)
    #[arg(long)]
    preset_file: Option<PathBuf>,

    /// Voicing when no preset is given (tube or clean)
    #[arg(long, default_value = "tube", conflicts_with_all = ["preset", "preset_file"])]
    voicing: Voicing,

    /// Parameter override (e.g., "drive=0.7"), applied after the preset
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,

    /// Oversampling factor (1, 2, 4 or 8)
    #[arg(long)]
    oversample: Option<usize>,

    /// Bypass the cabinet
    #[arg(long)]
    no_cabinet: bool,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    println!("Reading {}...", args.input.display());
    let mut audio = read_wav(&args.input)?;
    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        audio.num_frames(),
        audio.channels.len(),
        audio.sample_rate,
        audio.duration_secs()
    );

    let preset = match (&args.preset, &args.preset_file) {
        (Some(name), _) => load_preset(name)?,
        (None, Some(path)) => Preset::load(path)?,
        (None, None) => Preset::new("Default").with_voicing(args.voicing),
    };
    println!("Preset: {}", preset.name);

    let mut engine = build_engine(&preset, &args)?;
    engine.try_prepare(
        f64::from(audio.sample_rate),
        args.block_size,
        audio.channels.len(),
    )?;

    let input_stats = Stats::measure(&audio);

    let progress = ProgressBar::new((audio.num_frames() + engine.latency_samples()) as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );
    render(&mut engine, &mut audio, args.block_size, &progress);
    progress.finish_with_message("done");

    let output_stats = Stats::measure(&audio);
    println!("\nStats:");
    println!("  Input:  {input_stats}");
    println!("  Output: {output_stats}");

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &audio, args.bit_depth)?;
    println!("Done!");

    Ok(())
}

/// Engine configured by `preset` plus command-line overrides.
fn build_engine(preset: &Preset, args: &ProcessArgs) -> anyhow::Result<AmpEngine> {
    let mut config = preset.to_amp_config()?;
    if let Some(factor) = args.oversample {
        config.oversampling = oversampling_from_factor(factor)?;
    }
    if args.no_cabinet {
        config.cabinet = CabinetModel::None;
    }

    let params = Arc::new(AmpParams::new());
    preset.apply(&params)?;
    for (name, raw) in &args.param {
        let value = parse_param_value(raw)?;
        let id = validate_param(name, ParamValue::Value(value))?;
        params.set(id, value);
        tracing::debug!(param = %id, value, "parameter override");
    }

    Ok(AmpEngine::with_params(config, params))
}

/// Process `audio` in place, removing the engine's latency so the output
/// lines up with the input.
fn render(engine: &mut AmpEngine, audio: &mut Audio, block_size: usize, progress: &ProgressBar) {
    let latency = engine.latency_samples();
    let total = audio.num_frames() + latency;
    for channel in &mut audio.channels {
        channel.resize(total, 0.0);
    }

    let mut start = 0;
    while start < total {
        let end = (start + block_size).min(total);
        let mut block: Vec<&mut [f32]> = audio
            .channels
            .iter_mut()
            .map(|channel| &mut channel[start..end])
            .collect();
        engine.process(&mut block);
        start = end;
        progress.set_position(start as u64);
    }

    for channel in &mut audio.channels {
        channel.drain(..latency);
    }
}

struct Stats {
    rms: f32,
    peak: f32,
}

impl Stats {
    fn measure(audio: &Audio) -> Self {
        let samples = || audio.channels.iter().flatten();
        let count = samples().count();
        let rms = if count == 0 {
            0.0
        } else {
            (samples().map(|s| s * s).sum::<f32>() / count as f32).sqrt()
        };
        let peak = samples().fold(0.0f32, |m, s| m.max(s.abs()));
        Self { rms, peak }
    }
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RMS {:.1} dB, Peak {:.1} dB",
            linear_to_db(self.rms),
            linear_to_db(self.peak)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampsim_amp::AmpConfig;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ProcessArgs,
    }

    fn parse(extra: &[&str]) -> ProcessArgs {
        let argv = ["ampsim", "in.wav", "out.wav"].iter().chain(extra);
        Wrapper::try_parse_from(argv).unwrap().args
    }

    fn sine(len: usize) -> Vec<f32> {
        (0..len).map(|i| 0.5 * (i as f32 * 0.07).sin()).collect()
    }

    #[test]
    fn overrides_apply_after_preset() {
        let args = parse(&["--param", "drive=0.9", "--param", "chorus_enabled=on"]);
        let preset = load_preset("crunch").unwrap();
        let engine = build_engine(&preset, &args).unwrap();
        assert_eq!(engine.params().get(ampsim_amp::ParamId::Drive), 0.9);
        assert!(engine.params().snapshot().chorus_enabled());
    }

    #[test]
    fn unknown_or_out_of_range_param_fails() {
        let preset = Preset::new("x");
        assert!(build_engine(&preset, &parse(&["--param", "fuzz=0.5"])).is_err());
        assert!(build_engine(&preset, &parse(&["--param", "bass=3"])).is_err());
    }

    #[test]
    fn engine_flags_override_config() {
        let args = parse(&["--oversample", "1", "--no-cabinet"]);
        let engine = build_engine(&Preset::new("x"), &args).unwrap();
        assert_eq!(
            engine.config(),
            &AmpConfig::tube().with_oversampling(None).with_cabinet(CabinetModel::None)
        );
        assert!(build_engine(&Preset::new("x"), &parse(&["--oversample", "3"])).is_err());
    }

    #[test]
    fn preset_and_preset_file_conflict() {
        let argv = ["ampsim", "in.wav", "out.wav", "--preset", "lead", "--preset-file", "a.toml"];
        assert!(Wrapper::try_parse_from(argv).is_err());
    }

    #[test]
    fn render_compensates_latency() {
        let args = parse(&["--oversample", "2", "--no-cabinet"]);
        let mut engine = build_engine(&Preset::new("x"), &args).unwrap();
        engine.try_prepare(48000.0, 64, 2).unwrap();
        assert!(engine.latency_samples() > 0);

        let mut audio = Audio {
            channels: vec![sine(1000), sine(1000)],
            sample_rate: 48000,
        };
        render(&mut engine, &mut audio, 64, &ProgressBar::hidden());
        assert_eq!(audio.num_frames(), 1000);
        assert!(audio.channels.iter().flatten().all(|s| s.is_finite() && s.abs() <= 1.0));
    }

    #[test]
    fn block_size_does_not_change_output() {
        let build = || {
            let mut engine = build_engine(&Preset::new("x"), &parse(&[])).unwrap();
            engine.try_prepare(48000.0, 512, 1).unwrap();
            engine
        };
        let mut a = Audio {
            channels: vec![sine(2000)],
            sample_rate: 48000,
        };
        let mut b = Audio {
            channels: vec![sine(2000)],
            sample_rate: 48000,
        };
        render(&mut build(), &mut a, 512, &ProgressBar::hidden());
        render(&mut build(), &mut b, 100, &ProgressBar::hidden());
        for (x, y) in a.channels[0].iter().zip(&b.channels[0]) {
            assert!((x - y).abs() < 1e-4, "{x} vs {y}");
        }
    }
}
