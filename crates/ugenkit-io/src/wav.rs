//! WAV file reading and writing, one vector per channel.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;
use tracing::{debug, info};

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len()); // total across all channels
    let num_frames = total_samples / u64::from(spec.channels);
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// WAV file specification.
///
/// 32-bit files are written as IEEE float, 16- and 24-bit as PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Split interleaved frames into one vector per channel.
///
/// A trailing partial frame is dropped.
pub fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels.max(1);
    let mut out = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels.max(1)) {
        for (channel, &sample) in out.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    out
}

/// Join per-channel vectors into interleaved frames.
///
/// # Errors
///
/// [`Error::RaggedChannels`] when channel lengths differ.
pub fn interleave(channels: &[Vec<f32>]) -> Result<Vec<f32>> {
    let frames = channels.first().map_or(0, Vec::len);
    if let Some((channel, c)) = channels.iter().enumerate().find(|(_, c)| c.len() != frames) {
        return Err(Error::RaggedChannels {
            channel,
            expected: frames,
            found: c.len(),
        });
    }
    let mut out = Vec::with_capacity(frames * channels.len());
    for i in 0..frames {
        out.extend(channels.iter().map(|c| c[i]));
    }
    Ok(out)
}

/// Read a mono or stereo WAV file, one vector per channel.
///
/// Integer formats are scaled to `[-1, 1)`.
///
/// # Example
/// ```no_run
/// let (channels, spec) = ugenkit_io::read_wav("input.wav")?;
/// println!("{} channel(s) at {} Hz", channels.len(), spec.sample_rate);
/// # Ok::<(), ugenkit_io::Error>(())
/// ```
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<f32>>, WavSpec)> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels);
    if !(1..=2).contains(&channels) {
        return Err(Error::UnsupportedChannels(channels));
    }

    let samples: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let out = deinterleave(&samples, channels);
    debug!(
        path = %path.display(),
        channels,
        frames = out[0].len(),
        sample_rate = spec.sample_rate,
        "read wav"
    );
    Ok((out, spec))
}

/// Write one vector per channel to a WAV file.
///
/// The channel count comes from `channels`; `spec` supplies the sample
/// rate and bit depth. Integer formats clamp to full scale.
///
/// # Example
/// ```no_run
/// use ugenkit_io::{WavSpec, write_wav};
///
/// let silence = vec![vec![0.0f32; 48000]; 2];
/// write_wav("output.wav", &silence, WavSpec { bits_per_sample: 24, ..WavSpec::default() })?;
/// # Ok::<(), ugenkit_io::Error>(())
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, channels: &[Vec<f32>], spec: WavSpec) -> Result<()> {
    let path = path.as_ref();
    if !(1..=2).contains(&channels.len()) {
        return Err(Error::UnsupportedChannels(channels.len()));
    }
    if ![16, 24, 32].contains(&spec.bits_per_sample) {
        return Err(Error::UnsupportedBitDepth(spec.bits_per_sample));
    }
    let interleaved = interleave(channels)?;

    let spec = WavSpec {
        channels: channels.len() as u16,
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for &sample in &interleaved {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
        for &sample in &interleaved {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    info!(
        path = %path.display(),
        channels = spec.channels,
        bits = spec.bits_per_sample,
        frames = channels[0].len(),
        "wrote wav"
    );
    Ok(())
}
