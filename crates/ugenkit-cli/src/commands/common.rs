//! Shared CLI helpers used across multiple commands.

use clap::Args;
use std::path::Path;
use ugenkit_config::{Preset, UnitRegistry, get_factory_preset, parse_assignment};
use ugenkit_io::ProcessingEngine;

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, f64), String> {
    parse_assignment(s).map_err(|e| e.to_string())
}

/// Load a preset by factory name or file path.
pub fn load_preset(name: &str) -> anyhow::Result<Preset> {
    if let Some(preset) = get_factory_preset(name) {
        return Ok(preset);
    }

    let path = Path::new(name);
    if path.exists() {
        return Ok(Preset::load(path)?);
    }

    anyhow::bail!("Preset '{name}' not found. Use 'ugenkit presets' to see available presets.")
}

/// Unit selection shared by `process` and `impulse`.
#[derive(Args)]
pub struct UnitArgs {
    /// Unit to run (see `ugenkit units`)
    #[arg(short, long, required_unless_present = "preset", conflicts_with = "preset")]
    pub unit: Option<String>,

    /// Factory preset name or preset file (TOML)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Per-call parameter (e.g., "decay_time=4"), repeatable
    #[arg(long, value_parser = parse_key_val)]
    pub param: Vec<(String, f64)>,

    /// Construction option (e.g., "max_room_size=100"), repeatable
    #[arg(long = "option", value_parser = parse_key_val)]
    pub options: Vec<(String, f64)>,

    /// Control block size in samples (defaults to the preset's)
    #[arg(long)]
    pub block_size: Option<usize>,
}

impl UnitArgs {
    /// The selected preset, or a default one for `--unit`, with overrides applied.
    pub fn to_preset(&self) -> anyhow::Result<Preset> {
        let mut preset = match (&self.preset, &self.unit) {
            (Some(name), _) => load_preset(name)?,
            (None, Some(unit)) => Preset::new(unit.as_str(), unit.as_str()),
            (None, None) => anyhow::bail!("No unit specified. Use --unit or --preset"),
        };
        for (name, value) in &self.options {
            preset.options.insert(name.clone(), *value);
        }
        for (name, value) in &self.param {
            preset.params.insert(name.clone(), *value);
        }
        if let Some(block_size) = self.block_size {
            preset.block_size = block_size;
        }
        Ok(preset)
    }
}

/// Validate `preset` and wrap its unit for `channels` input channels.
pub fn build_engine(
    preset: &Preset,
    sample_rate: u32,
    channels: usize,
) -> anyhow::Result<ProcessingEngine> {
    let registry = UnitRegistry::new();
    let (unit, params) = preset.build(&registry, sample_rate)?;
    Ok(ProcessingEngine::new(
        unit,
        params,
        channels,
        preset.block_size,
    )?)
}

pub fn rms(channels: &[Vec<f32>]) -> f32 {
    let count: usize = channels.iter().map(Vec::len).sum();
    if count == 0 {
        return 0.0;
    }
    let sum: f32 = channels.iter().flatten().map(|s| s * s).sum();
    (sum / count as f32).sqrt()
}

pub fn peak(channels: &[Vec<f32>]) -> f32 {
    channels.iter().flatten().map(|s| s.abs()).fold(0.0, f32::max)
}

pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}
