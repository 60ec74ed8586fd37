//! Reverb demo: impulse response energy over time for every reverb kind.
//!
//! Run with: cargo run -p ugenkit-effects --example reverb_demo

use ugenkit_core::Processor;
use ugenkit_effects::{Reverb, ReverbKind};

const SAMPLE_RATE: u32 = 48000;
const WINDOW: usize = 4800;
const WINDOWS: usize = 20;

fn main() -> Result<(), ugenkit_core::Error> {
    println!("Impulse response energy per 100 ms window (dB)");
    println!("==============================================\n");

    print!("{:>8}", "Window");
    for kind in ReverbKind::ALL {
        print!(" {:>10}", kind.id());
    }
    println!();

    let mut table = Vec::new();
    for kind in ReverbKind::ALL {
        let mut reverb = Reverb::from_id(kind.id(), SAMPLE_RATE)?;
        let params = reverb.default_params();
        let channels = reverb.layout().max_channels();

        let mut input = vec![vec![0.0f32; WINDOW]; channels];
        for channel in &mut input {
            channel[0] = 1.0;
        }
        let mut energies = Vec::with_capacity(WINDOWS);
        for _ in 0..WINDOWS {
            let mut output = vec![vec![0.0f32; WINDOW]; channels];
            {
                let inputs: Vec<&[f32]> = input.iter().map(|c| &c[..]).collect();
                let mut outputs: Vec<&mut [f32]> = output.iter_mut().map(|c| &mut c[..]).collect();
                reverb.process(&inputs, &mut outputs, &params)?;
            }
            let energy: f32 = output[0].iter().map(|y| y * y).sum();
            energies.push(10.0 * energy.max(1e-12).log10());
            for channel in &mut input {
                channel[0] = 0.0;
            }
        }
        table.push(energies);
    }

    for window in 0..WINDOWS {
        print!("{:>8}", window);
        for energies in &table {
            print!(" {:>10.1}", energies[window]);
        }
        println!();
    }

    Ok(())
}
