//! Impulse response rendering command.

use super::common::{UnitArgs, build_engine, linear_to_db, peak};
use clap::Args;
use std::path::PathBuf;
use ugenkit_io::{WavSpec, write_wav};

#[derive(Args)]
pub struct ImpulseArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    unit: UnitArgs,

    /// Length of the rendered response in seconds
    #[arg(short, long, default_value = "2.0")]
    duration: f64,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

/// Seconds until the response stays below `peak * 10^(floor_db / 20)`.
fn tail_seconds(channels: &[Vec<f32>], floor_db: f32, sample_rate: u32) -> f64 {
    let threshold = peak(channels) * 10f32.powf(floor_db / 20.0);
    let last = channels
        .iter()
        .filter_map(|c| c.iter().rposition(|s| s.abs() > threshold))
        .max()
        .map_or(0, |i| i + 1);
    last as f64 / f64::from(sample_rate)
}

pub fn run(args: ImpulseArgs) -> anyhow::Result<()> {
    if !args.duration.is_finite() || args.duration <= 0.0 {
        anyhow::bail!("Duration must be a positive number of seconds");
    }
    let frames = (args.duration * f64::from(args.sample_rate)).round() as usize;
    if frames == 0 {
        anyhow::bail!("Duration is shorter than one sample");
    }

    let preset = args.unit.to_preset()?;
    let mut engine = build_engine(&preset, args.sample_rate, 1)?;

    let mut impulse = vec![0.0f32; frames];
    impulse[0] = 1.0;
    let output = engine.process_buffer(&[impulse])?;

    println!(
        "Impulse response of {}: {} channel(s), {:.2}s at {} Hz",
        engine.unit_id(),
        output.len(),
        args.duration,
        args.sample_rate
    );
    println!("  Peak {:.1} dB", linear_to_db(peak(&output)));
    println!(
        "  Tail above -60 dB: {:.3}s",
        tail_seconds(&output, -60.0, args.sample_rate)
    );

    let spec = WavSpec {
        channels: output.len() as u16,
        sample_rate: args.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    write_wav(&args.output, &output, spec)?;
    println!("Wrote {}", args.output.display());

    Ok(())
}
