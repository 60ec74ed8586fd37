//! Audio file I/O and block rendering for ugenkit units.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for loading and saving
//!   mono or stereo audio as one vector per channel
//! - **Offline processing**: [`ProcessingEngine`] for running a unit over
//!   whole buffers in fixed-size blocks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ugenkit_io::{ProcessingEngine, read_wav, write_wav};
//! use ugenkit_registry::UnitRegistry;
//!
//! let (channels, spec) = read_wav("input.wav")?;
//!
//! let registry = UnitRegistry::new();
//! let unit = registry.create("gverb", spec.sample_rate, 64, &[]).unwrap();
//! let params = registry.get("gverb").unwrap().default_params();
//! let mut engine = ProcessingEngine::new(unit, params, channels.len(), 1024)?;
//! let processed = engine.process_buffer(&channels)?;
//!
//! write_wav("output.wav", &processed, spec)?;
//! # Ok::<(), ugenkit_io::Error>(())
//! ```

mod engine;
mod wav;

pub use engine::ProcessingEngine;
pub use wav::{
    WavFormat, WavInfo, WavSpec, deinterleave, interleave, read_wav, read_wav_info, write_wav,
};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Only mono and stereo audio is handled.
    #[error("Unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannels(usize),

    /// The requested bit depth cannot be written.
    #[error("Unsupported bit depth: {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),

    /// Channels of one buffer have different lengths.
    #[error("Channel {channel} has {found} samples, expected {expected}")]
    RaggedChannels {
        /// Index of the offending channel.
        channel: usize,
        /// Length of the first channel.
        expected: usize,
        /// Length of the offending channel.
        found: usize,
    },

    /// The unit rejected a processing call.
    #[error("Processing error: {0}")]
    Engine(#[from] ugenkit_core::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
