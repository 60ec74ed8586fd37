//! Factory preset listing, display and export.

use super::common::load_preset;
use clap::Args;
use std::path::PathBuf;
use ugenkit_config::{Preset, UnitRegistry, factory_preset_names, factory_presets};

#[derive(Args)]
pub struct PresetsArgs {
    /// Factory preset name or preset file to show
    #[arg(value_name = "NAME")]
    name: Option<String>,

    /// Write the preset as TOML to PATH
    #[arg(long, value_name = "PATH", requires = "name")]
    export: Option<PathBuf>,

    /// Overwrite an existing export file
    #[arg(long, requires = "export")]
    force: bool,
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    let Some(name) = &args.name else {
        list_presets();
        return Ok(());
    };

    let preset = load_preset(name)?;
    match &args.export {
        Some(path) => {
            if path.exists() && !args.force {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite.",
                    path.display()
                );
            }
            preset.save(path)?;
            println!("Exported preset '{}' to {}", preset.name, path.display());
        }
        None => show_preset(&preset),
    }
    Ok(())
}

fn list_presets() {
    println!("Factory Presets:");
    println!("================");
    for (id, preset) in factory_preset_names().iter().zip(factory_presets()) {
        let desc = preset.description.as_deref().unwrap_or("");
        println!("  {:16} {:10} {}", id, preset.unit, desc);
    }
    println!();
    println!("Use 'ugenkit presets <name>' for details.");
}

fn show_preset(preset: &Preset) {
    println!("Preset: {}", preset.name);
    println!("{}", "=".repeat(8 + preset.name.len()));
    println!();

    if let Some(desc) = &preset.description {
        println!("Description: {desc}");
        println!();
    }

    println!("Unit:        {}", preset.unit);
    println!("Sample Rate: {} Hz", preset.sample_rate);
    println!("Block Size:  {}", preset.block_size);
    println!();

    let registry = UnitRegistry::new();
    let Some(descriptor) = registry.get(&preset.unit) else {
        println!("(unit '{}' is not registered)", preset.unit);
        return;
    };

    if !descriptor.options.is_empty() {
        println!("Options:");
        for spec in descriptor.options {
            match preset.options.get(spec.name) {
                Some(value) => println!("  {:16} = {}", spec.name, value),
                None => println!("  {:16} = {} (default)", spec.name, spec.default),
            }
        }
        println!();
    }

    println!("Parameters:");
    for (spec, value) in descriptor.params.iter().zip(preset.param_values(descriptor)) {
        let marker = if preset.params.contains_key(spec.name) {
            ""
        } else {
            " (default)"
        };
        println!("  {:16} = {}{}", spec.name, value, marker);
    }

    if let Err(e) = preset.validate(&registry) {
        println!();
        println!("Warning: {e}");
    }
}
