//! File-based unit processing command.

use super::common::{UnitArgs, build_engine, linear_to_db, peak, rms};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;
use ugenkit_io::{WavSpec, read_wav, write_wav};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (mono or stereo)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    unit: UnitArgs,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    println!("Reading {}...", args.input.display());
    let (input, spec) = read_wav(&args.input)?;
    let frames = input[0].len();

    println!(
        "  {} channel(s), {} frames, {} Hz, {:.2}s",
        input.len(),
        frames,
        spec.sample_rate,
        frames as f64 / f64::from(spec.sample_rate)
    );

    let preset = args.unit.to_preset()?;
    let mut engine = build_engine(&preset, spec.sample_rate, input.len())?;

    println!(
        "Processing with {} ({} -> {} channel(s), block size {})...",
        engine.unit_id(),
        engine.input_channels(),
        engine.output_channels(),
        engine.block_size()
    );

    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );
    let output = engine.process_buffer_with(&input, |n| pb.inc(n as u64))?;
    pb.finish_with_message("done");

    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&input)),
        linear_to_db(peak(&input))
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&output)),
        linear_to_db(peak(&output))
    );

    let out_spec = WavSpec {
        channels: output.len() as u16,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &output, out_spec)?;
    info!(unit = engine.unit_id(), frames, "processing complete");
    println!("Done!");

    Ok(())
}
