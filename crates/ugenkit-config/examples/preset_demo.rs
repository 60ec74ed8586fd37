//! Preset demo: factory presets, overrides, validation and building units.
//!
//! Run with: cargo run -p ugenkit-config --example preset_demo

use ugenkit_config::{
    Preset, UnitRegistry, factory_preset_names, get_factory_preset, parse_assignment,
};
use ugenkit_core::Processor;

fn main() {
    let registry = UnitRegistry::new();

    // --- Factory presets ---
    println!("=== Factory Presets ===\n");
    println!("{:<16} {:<10} {}", "Name", "Unit", "Description");
    println!("{:-<16} {:-<10} {:-<40}", "", "", "");
    for name in factory_preset_names() {
        if let Some(preset) = get_factory_preset(name) {
            println!(
                "{:<16} {:<10} {}",
                name,
                preset.unit,
                preset.description.as_deref().unwrap_or("")
            );
        }
    }

    // --- Overrides ---
    println!("\n=== Command-line Overrides ===\n");
    let Some(mut hall) = get_factory_preset("large-hall") else {
        return;
    };
    for arg in ["decay_time=6.5", "tail_level=0.9", "tail_level", "damping=dark"] {
        match parse_assignment(arg) {
            Ok((key, value)) => {
                println!("  {arg:<18} -> {key} = {value}");
                hall.params.insert(key, value);
            }
            Err(e) => println!("  {arg:<18} -> rejected: {e}"),
        }
    }

    // --- Validation ---
    println!("\n=== Validation ===\n");
    let broken = Preset::new("Broken", "gverb")
        .with_param("decay_time", 500.0)
        .with_param("wetness", 0.5);
    match broken.validate(&registry) {
        Ok(()) => println!("  unexpectedly valid"),
        Err(e) => println!("  {e}"),
    }

    // --- Build and run ---
    println!("\n=== Impulse Through '{}' ===\n", hall.name);
    let (mut unit, params) = match hall.build(&registry, 48000) {
        Ok(built) => built,
        Err(e) => {
            println!("  build failed: {e}");
            return;
        }
    };
    let mut impulse = vec![0.0f32; 48000];
    impulse[0] = 1.0;
    let mut left = vec![0.0f32; 48000];
    let mut right = vec![0.0f32; 48000];
    if let Err(e) = unit.process(
        &[&impulse[..], &impulse[..]],
        &mut [&mut left[..], &mut right[..]],
        &params,
    ) {
        println!("  process failed: {e}");
        return;
    }
    for (i, window) in left.chunks(9600).enumerate() {
        let energy: f32 = window.iter().map(|s| s * s).sum();
        println!("  {:>4} ms  {:>8.2} dB", i * 200, 10.0 * energy.max(1e-20).log10());
    }

    // --- TOML ---
    println!("\n=== TOML ===\n");
    if let Ok(toml) = hall.to_toml() {
        println!("{toml}");
    }
}
