//! Unit listing and information command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use serde_json::{Value, json};
use ugenkit_config::{ParamSpec, UnitCategory, UnitDescriptor, UnitRegistry};

#[derive(Args)]
pub struct UnitsArgs {
    /// Show details for a specific unit
    #[arg(value_name = "UNIT")]
    unit: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,
}

fn spec_json(spec: &ParamSpec) -> Value {
    json!({
        "name": spec.name,
        "description": spec.description,
        "default": spec.default,
        "min": spec.min,
        "max": spec.max,
    })
}

fn descriptor_json(descriptor: &UnitDescriptor) -> Value {
    json!({
        "id": descriptor.id,
        "name": descriptor.name,
        "description": descriptor.description,
        "category": descriptor.category.name(),
        "layout": descriptor.layout.name(),
        "options": descriptor.options.iter().map(spec_json).collect::<Vec<_>>(),
        "params": descriptor.params.iter().map(spec_json).collect::<Vec<_>>(),
    })
}

fn print_table(title: &str, specs: &[ParamSpec]) {
    println!("{title}:");
    println!();
    println!(
        "  {:16}  {:44}  {:>8}  {}",
        "Name", "Description", "Default", "Range"
    );
    println!(
        "  {:16}  {:44}  {:>8}  {}",
        "----", "-----------", "-------", "-----"
    );
    for spec in specs {
        println!(
            "  {:16}  {:44}  {:>8}  {} to {}",
            spec.name, spec.description, spec.default, spec.min, spec.max
        );
    }
    println!();
}

fn show_unit(descriptor: &UnitDescriptor) {
    println!("{} ({})", descriptor.name, descriptor.id);
    println!("{}", "=".repeat(descriptor.name.len() + descriptor.id.len() + 3));
    println!();
    println!("{}", descriptor.description);
    println!();
    println!("Category: {}", descriptor.category.name());
    println!("Channels: {}", descriptor.layout.name());
    println!();

    if !descriptor.options.is_empty() {
        print_table("Options (fixed at construction)", descriptor.options);
    }
    print_table("Parameters (per call, in order)", descriptor.params);

    let params: Vec<String> = descriptor
        .params
        .iter()
        .take(2)
        .map(|p| format!("{}={}", p.name, p.default))
        .collect();
    println!("Example usage:");
    println!();
    println!(
        "  ugenkit process input.wav output.wav --unit {} --param {}",
        descriptor.id,
        params.join(" --param ")
    );
    println!("  ugenkit impulse ir.wav --unit {}", descriptor.id);
}

pub fn run(args: UnitsArgs) -> anyhow::Result<()> {
    let registry = UnitRegistry::new();

    if let Some(id) = &args.unit {
        let descriptor = registry
            .get(&id.to_lowercase())
            .ok_or_else(|| anyhow::anyhow!("Unknown unit: {id}"))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&descriptor_json(descriptor))?);
        } else {
            show_unit(descriptor);
        }
        return Ok(());
    }

    if args.json {
        let all: Vec<Value> = registry.all_units().into_iter().map(descriptor_json).collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("Available Units");
    println!("===============");
    for category in UnitCategory::ALL {
        println!();
        println!("{} - {}", category.name(), category.description());
        for descriptor in registry.units_in_category(category) {
            println!(
                "  {:10} {:15} {}",
                descriptor.id,
                descriptor.layout.name(),
                descriptor.description
            );
        }
    }
    println!();
    println!("Use 'ugenkit units <id>' for parameter details.");

    Ok(())
}
