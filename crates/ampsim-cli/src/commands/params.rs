//! Parameter listing.

#![allow(clippy::print_literal)] // Table headers use literal strings

use ampsim_amp::{ParamId, ParamUnit};
use clap::Args;
use serde::Serialize;

#[derive(Args)]
pub struct ParamsArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

/// One row of the listing.
#[derive(Debug, Serialize)]
struct ParamInfo {
    id: &'static str,
    label: &'static str,
    default: f32,
    default_display: String,
    min_display: String,
    max_display: String,
    switch: bool,
}

impl ParamInfo {
    fn new(id: ParamId) -> Self {
        let desc = id.descriptor();
        Self {
            id: id.name(),
            label: desc.label,
            default: desc.default,
            default_display: desc.format_value(desc.default),
            min_display: desc.format_value(0.0),
            max_display: desc.format_value(1.0),
            switch: desc.unit == ParamUnit::Switch,
        }
    }
}

fn all_params() -> Vec<ParamInfo> {
    ParamId::ALL.into_iter().map(ParamInfo::new).collect()
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let params = all_params();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&params)?);
        return Ok(());
    }

    println!(
        "  {:16}  {:16}  {:>8}  {:>12}  {}",
        "Id", "Label", "Default", "Value", "Range"
    );
    println!(
        "  {:16}  {:16}  {:>8}  {:>12}  {}",
        "--", "-----", "-------", "-----", "-----"
    );
    for p in &params {
        println!(
            "  {:16}  {:16}  {:>8.2}  {:>12}  {} .. {}",
            p.id, p.label, p.default, p.default_display, p.min_display, p.max_display
        );
    }
    println!();
    println!("Set with: ampsim process in.wav out.wav --param drive=0.7");
    Ok(())
}
