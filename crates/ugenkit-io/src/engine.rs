//! Offline block processing of whole buffers through a unit.

use crate::{Error, Result};
use tracing::debug;
use ugenkit_core::{ChannelLayout, Processor};
use ugenkit_registry::Unit;

/// How input channels map onto unit instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Routing {
    /// One instance of a mono unit per channel.
    PerChannel,
    /// One instance sees every channel. A mono input is fed to both inputs
    /// of a stereo-capable unit.
    Joint,
}

/// Runs a [`Unit`] over multichannel buffers in fixed-size blocks.
///
/// Mono-only units are cloned once per input channel. Stereo and
/// mono-or-stereo units always produce two output channels; a mono input
/// is duplicated onto both of their inputs.
///
/// # Example
///
/// ```rust
/// use ugenkit_io::ProcessingEngine;
/// use ugenkit_registry::UnitRegistry;
///
/// let registry = UnitRegistry::new();
/// let unit = registry.create("lpf", 48000, 64, &[]).unwrap();
/// let mut engine = ProcessingEngine::new(unit, vec![500.0], 2, 256).unwrap();
///
/// let stereo = vec![vec![0.5f32; 1000], vec![-0.5f32; 1000]];
/// let out = engine.process_buffer(&stereo).unwrap();
/// assert_eq!(out.len(), 2);
/// assert_eq!(out[0].len(), 1000);
/// ```
#[derive(Debug, Clone)]
pub struct ProcessingEngine {
    lanes: Vec<Unit>,
    params: Vec<f64>,
    routing: Routing,
    input_channels: usize,
    output_channels: usize,
    block_size: usize,
}

impl ProcessingEngine {
    /// Prepare `unit` for `input_channels` channels, called with `params`
    /// every `block_size` frames.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedChannels`] unless `input_channels` is 1 or 2,
    /// [`Error::Engine`] for a zero block size.
    pub fn new(
        unit: Unit,
        params: Vec<f64>,
        input_channels: usize,
        block_size: usize,
    ) -> Result<Self> {
        if !(1..=2).contains(&input_channels) {
            return Err(Error::UnsupportedChannels(input_channels));
        }
        if block_size == 0 {
            return Err(ugenkit_core::Error::invalid_config("block_size", "must be positive").into());
        }

        let layout = unit.layout();
        let (routing, lanes, output_channels) = match layout {
            ChannelLayout::Mono => (
                Routing::PerChannel,
                vec![unit; input_channels],
                input_channels,
            ),
            ChannelLayout::Stereo | ChannelLayout::MonoOrStereo => {
                (Routing::Joint, vec![unit], layout.max_channels())
            }
        };
        debug!(
            unit = lanes[0].id(),
            input_channels,
            output_channels,
            block_size,
            "processing engine ready"
        );

        Ok(Self {
            lanes,
            params,
            routing,
            input_channels,
            output_channels,
            block_size,
        })
    }

    /// Identifier of the wrapped unit.
    pub fn unit_id(&self) -> &'static str {
        self.lanes[0].id()
    }

    /// Channels expected by [`process_block`](Self::process_block).
    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    /// Channels produced by [`process_block`](Self::process_block).
    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// Frames per processing call in [`process_buffer`](Self::process_buffer).
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Positional parameters passed on every call.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Replace the parameters used from the next block on.
    pub fn set_params(&mut self, params: Vec<f64>) {
        self.params = params;
    }

    /// Process one block per channel.
    ///
    /// # Errors
    ///
    /// [`Error::Engine`] when the unit rejects the buffers or parameters.
    pub fn process_block(&mut self, inputs: &[&[f32]], outputs: &mut [&mut [f32]]) -> Result<()> {
        match self.routing {
            Routing::PerChannel => {
                if inputs.len() != self.lanes.len() || outputs.len() != self.lanes.len() {
                    return Err(ugenkit_core::Error::ChannelCount {
                        expected: ChannelLayout::Mono,
                        found: inputs.len().max(outputs.len()),
                    }
                    .into());
                }
                for ((lane, input), output) in
                    self.lanes.iter_mut().zip(inputs).zip(outputs.iter_mut())
                {
                    lane.process(&[*input], &mut [&mut **output], &self.params)?;
                }
            }
            Routing::Joint => {
                let unit = &mut self.lanes[0];
                match inputs {
                    [mono] => unit.process(&[*mono, *mono], outputs, &self.params)?,
                    _ => unit.process(inputs, outputs, &self.params)?,
                }
            }
        }
        Ok(())
    }

    /// Process whole channels, returning new output channels.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedChannels`] when the channel count differs from the
    /// one given at construction, [`Error::RaggedChannels`] for channels of
    /// different lengths, [`Error::Engine`] from the unit.
    pub fn process_buffer(&mut self, input: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        self.process_buffer_with(input, |_| {})
    }

    /// As [`process_buffer`](Self::process_buffer), calling `on_block` with
    /// the frame count of each processed block.
    pub fn process_buffer_with<F: FnMut(usize)>(
        &mut self,
        input: &[Vec<f32>],
        mut on_block: F,
    ) -> Result<Vec<Vec<f32>>> {
        if input.len() != self.input_channels {
            return Err(Error::UnsupportedChannels(input.len()));
        }
        let frames = input[0].len();
        if let Some((channel, c)) = input.iter().enumerate().find(|(_, c)| c.len() != frames) {
            return Err(Error::RaggedChannels {
                channel,
                expected: frames,
                found: c.len(),
            });
        }

        let mut output = vec![vec![0.0f32; frames]; self.output_channels];
        let mut start = 0;
        while start < frames {
            let end = (start + self.block_size).min(frames);
            let inputs: Vec<&[f32]> = input.iter().map(|c| &c[start..end]).collect();
            let mut outputs: Vec<&mut [f32]> =
                output.iter_mut().map(|c| &mut c[start..end]).collect();
            self.process_block(&inputs, &mut outputs)?;
            on_block(end - start);
            start = end;
        }
        debug!(unit = self.unit_id(), frames, "processed buffer");
        Ok(output)
    }

    /// Reset every unit instance.
    pub fn reset(&mut self) {
        for lane in &mut self.lanes {
            lane.reset();
        }
    }
}
