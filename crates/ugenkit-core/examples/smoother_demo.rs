//! Smoother demo: ramp and lag trajectories, then a lag-smoothed filter sweep.
//!
//! Run with: cargo run -p ugenkit-core --example smoother_demo

use ugenkit_core::{BiquadFilter, FilterParams, FilterResponse, Lag, Processor, Ramp};

fn main() -> Result<(), ugenkit_core::Error> {
    // 100 control periods per second.
    let sample_rate = 48000;
    let block_size = 480;

    println!("=== Step from 0 to 1 with a 0.1 s glide ===\n");
    println!("{:>6} {:>10} {:>10}", "Call", "Ramp", "Lag");
    println!("{:->6} {:->10} {:->10}", "", "", "");

    let mut ramp = Ramp::new(sample_rate, block_size)?;
    let mut lag = Lag::new(sample_rate, block_size)?;
    ramp.next(0.0, 0.1)?;
    lag.next(0.0, 0.1)?;
    for call in 1..=15 {
        let r = ramp.next(1.0, 0.1)?;
        let l = lag.next(1.0, 0.1)?;
        println!("{call:>6} {r:>10.4} {l:>10.4}");
    }

    println!("\n=== Lowpass swept from 200 Hz to 5 kHz through a lag ===\n");
    println!("{:>6} {:>12} {:>12}", "Block", "Cutoff", "Out RMS");
    println!("{:->6} {:->12} {:->12}", "", "", "");

    let audio_block = 64;
    let mut cutoff = Lag::new(sample_rate, audio_block)?;
    let mut filter = BiquadFilter::new(FilterResponse::LowPass, sample_rate, audio_block)?;
    let mut phase = 0u32;
    let mut output = vec![0.0f32; audio_block];
    cutoff.next(200.0, 0.05)?;

    for block in 0..40 {
        // Noise-like input: a cheap linear congruential generator.
        let input: Vec<f32> = (0..audio_block)
            .map(|_| {
                phase = phase.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (phase >> 8) as f32 / (1u32 << 24) as f32 - 0.5
            })
            .collect();
        let frequency = cutoff.next(5000.0, 0.05)?;
        filter.process_mono(&input, &mut output, &FilterParams::new(frequency))?;
        if block % 4 == 0 {
            let rms = (output.iter().map(|y| y * y).sum::<f32>() / audio_block as f32).sqrt();
            println!("{block:>6} {frequency:>10.1}Hz {rms:>12.4}");
        }
    }

    Ok(())
}
