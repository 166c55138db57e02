//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use refmaster_core::SampleBuffer;
use std::path::Path;

/// Bit depths accepted by [`write_wav`].
pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

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
    /// Number of audio channels.
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
    let total_samples = u64::from(reader.len());
    let num_frames = total_samples / u64::from(spec.channels.max(1));
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
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
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

/// Read a mono or stereo WAV file into a [`SampleBuffer`].
///
/// Integer PCM is scaled to ±1; float data passes through.
///
/// # Example
/// ```ignore
/// let (buffer, spec) = read_wav("input.wav")?;
/// println!("{} frames at {} Hz", buffer.frames(), spec.sample_rate);
/// ```
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(SampleBuffer, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    if !(1..=2).contains(&spec.channels) {
        return Err(Error::UnsupportedChannels(spec.channels));
    }

    let samples: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << spec.bits_per_sample.saturating_sub(1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    tracing::debug!(
        frames = samples.len() / spec.channels as usize,
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        bits = spec.bits_per_sample,
        "read wav"
    );
    let buffer = SampleBuffer::new(samples, spec.sample_rate, spec.channels)?;
    Ok((buffer, spec))
}

/// Write `buffer` to a WAV file at `bits_per_sample` (16 or 24 bit integer,
/// or 32 bit float). Integer output is clamped to full scale.
///
/// # Example
/// ```ignore
/// let silence = SampleBuffer::new(vec![0.0; 96000], 48000, 2)?;
/// write_wav("output.wav", &silence, 24)?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, buffer: &SampleBuffer, bits_per_sample: u16) -> Result<()> {
    if !SUPPORTED_BIT_DEPTHS.contains(&bits_per_sample) {
        return Err(Error::UnsupportedBitDepth(bits_per_sample));
    }
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample,
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if bits_per_sample == 32 {
        for &sample in buffer.samples() {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i32 << (bits_per_sample - 1)) as f32;
        for &sample in buffer.samples() {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn stereo_ramp(frames: usize) -> SampleBuffer {
        let samples = (0..frames)
            .flat_map(|i| {
                let x = (i as f32 / frames as f32) * 1.8 - 0.9;
                [x, -x]
            })
            .collect();
        SampleBuffer::new(samples, 48000, 2).unwrap()
    }

    #[test]
    fn test_roundtrip_f32_keeps_channels() {
        let buffer = stereo_ramp(1000);
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &buffer, 32).unwrap();

        let (loaded, spec) = read_wav(file.path()).unwrap();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 32);
        assert_eq!(loaded, buffer);
    }

    #[test]
    fn test_roundtrip_i24() {
        let buffer = stereo_ramp(1000);
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &buffer, 24).unwrap();

        let (loaded, spec) = read_wav(file.path()).unwrap();
        assert_eq!(spec.bits_per_sample, 24);
        for (a, b) in buffer.samples().iter().zip(loaded.samples()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_int_output_is_clamped() {
        let hot = SampleBuffer::from_mono(vec![1.5, -1.5, 0.0], 44100).unwrap();
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &hot, 16).unwrap();

        let (loaded, _) = read_wav(file.path()).unwrap();
        assert!(loaded.samples()[0] < 1.0);
        assert_eq!(loaded.samples()[1], -1.0);
    }

    #[test]
    fn test_rejects_unsupported_bit_depth() {
        let file = NamedTempFile::new().unwrap();
        let err = write_wav(file.path(), &stereo_ramp(10), 8).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBitDepth(8)));
    }

    #[test]
    fn test_read_info() {
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &stereo_ramp(4800), 16).unwrap();
        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.num_frames, 4800);
        assert_eq!(info.format, WavFormat::Pcm);
        assert!((info.duration_secs - 0.1).abs() < 1e-9);
    }
}
