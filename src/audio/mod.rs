//! WAV decode/encode helpers.
//!
//! Every intermediate audio artifact in the pipeline is a mono PCM WAV;
//! this module is the single place that reads and writes them.

pub mod tempo;

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{ReplaceError, Result};

/// Duration of `sample_count` mono samples at `sample_rate`.
pub fn duration_in_seconds(sample_count: usize, sample_rate: u32) -> f64 {
    sample_count as f64 / sample_rate as f64
}

/// Decode a WAV file into mono f32 samples in [-1.0, 1.0]. Multi-channel
/// input is folded down by averaging.
pub fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader = WavReader::open(path).map_err(|e| {
        ReplaceError::AudioProcessing(format!("cannot open {}: {}", path.display(), e))
    })?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    if channels == 1 {
        return Ok((interleaved, spec.sample_rate));
    }

    let mono: Vec<f32> = interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();

    Ok((mono, spec.sample_rate))
}

/// Encode mono f32 samples as 16-bit PCM WAV.
pub fn write_wav_mono(samples: &[f32], sample_rate: u32, path: &Path) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Write a short silent WAV. Used when the transcript is empty: the
/// downstream stages still need a well-formed audio artifact.
pub fn write_silent_wav(path: &Path, seconds: f64, sample_rate: u32) -> Result<()> {
    let sample_count = (seconds * sample_rate as f64).round() as usize;
    let silence = vec![0.0f32; sample_count.max(1)];
    write_wav_mono(&silence, sample_rate, path)
}
