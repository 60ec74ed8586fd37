//! The [`Processor`] trait shared by smoothers, filters and reverbs.
//!
//! Every processor consumes one block per channel and writes one block per
//! channel of the same length. Parameters arrive with each call; a processor
//! decides on its own whether they changed and how to move between old and
//! new values without clicks.
//!
//! ## Design Decisions
//!
//! - **Slices of slices**: `&[&[f32]]` in, `&mut [&mut [f32]]` out. Callers
//!   keep ownership of their buffers and nothing is allocated per call.
//! - **Validate first**: implementations check channel counts, lengths and
//!   parameters before touching state, so an `Err` leaves them unchanged.
//!   [`check_buffers`] covers the buffer half of that.

use crate::Error;

/// Channel counts a processor accepts. Output count always equals input count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    /// Exactly one channel.
    Mono,
    /// Exactly two channels.
    Stereo,
    /// One or two channels.
    MonoOrStereo,
}

impl ChannelLayout {
    /// Whether `channels` inputs are accepted.
    pub const fn accepts(&self, channels: usize) -> bool {
        match self {
            Self::Mono => channels == 1,
            Self::Stereo => channels == 2,
            Self::MonoOrStereo => channels == 1 || channels == 2,
        }
    }

    /// Largest accepted channel count.
    pub const fn max_channels(&self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo | Self::MonoOrStereo => 2,
        }
    }

    /// Lowercase name used in messages and listings.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mono => "mono",
            Self::Stereo => "stereo",
            Self::MonoOrStereo => "mono or stereo",
        }
    }
}

/// Block processor over one or two channels.
///
/// # Example
///
/// ```rust
/// use ugenkit_core::{ChannelLayout, Error, Processor, check_buffers};
///
/// struct Gain;
///
/// impl Processor for Gain {
///     type Params = f32;
///
///     fn layout(&self) -> ChannelLayout {
///         ChannelLayout::MonoOrStereo
///     }
///
///     fn process(
///         &mut self,
///         inputs: &[&[f32]],
///         outputs: &mut [&mut [f32]],
///         gain: &f32,
///     ) -> Result<(), Error> {
///         check_buffers(self.layout(), inputs, outputs)?;
///         for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
///             for (x, y) in input.iter().zip(output.iter_mut()) {
///                 *y = x * gain;
///             }
///         }
///         Ok(())
///     }
///
///     fn reset(&mut self) {}
/// }
///
/// let mut out = [0.0; 2];
/// Gain.process_mono(&[1.0, 2.0], &mut out, &0.5).unwrap();
/// assert_eq!(out, [0.5, 1.0]);
/// ```
pub trait Processor {
    /// Per-call parameter set.
    type Params: ?Sized;

    /// Channel counts accepted by [`process`](Self::process).
    fn layout(&self) -> ChannelLayout;

    /// Process one block per channel.
    ///
    /// # Errors
    ///
    /// Argument errors for unaccepted channel counts, mismatched lengths or
    /// invalid parameters. State is unchanged when an error is returned.
    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &Self::Params,
    ) -> Result<(), Error>;

    /// Return to the freshly constructed state.
    fn reset(&mut self);

    /// Single-channel convenience wrapper around [`process`](Self::process).
    fn process_mono(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        params: &Self::Params,
    ) -> Result<(), Error> {
        self.process(&[input], &mut [output], params)
    }
}

/// Validate channel counts and lengths; returns the frame count.
///
/// # Errors
///
/// [`Error::ChannelCount`] when `layout` rejects the input count or the output
/// count differs from it, [`Error::LengthMismatch`] when any buffer length
/// differs from the first input.
pub fn check_buffers(
    layout: ChannelLayout,
    inputs: &[&[f32]],
    outputs: &[&mut [f32]],
) -> Result<usize, Error> {
    if !layout.accepts(inputs.len()) {
        return Err(Error::ChannelCount {
            expected: layout,
            found: inputs.len(),
        });
    }
    if outputs.len() != inputs.len() {
        return Err(Error::ChannelCount {
            expected: layout,
            found: outputs.len(),
        });
    }
    let frames = inputs[0].len();
    let mismatch = inputs
        .iter()
        .map(|c| c.len())
        .chain(outputs.iter().map(|c| c.len()))
        .find(|&len| len != frames);
    match mismatch {
        Some(found) => Err(Error::LengthMismatch {
            expected: frames,
            found,
        }),
        None => Ok(frames),
    }
}
