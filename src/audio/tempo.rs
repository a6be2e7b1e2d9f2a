//! Tempo compression of the synthesized narration.
//!
//! Time is compressed by resampling: the waveform is resampled down by
//! the tempo factor and written back at the original sample rate, so the
//! playback duration shrinks to `input / factor` and the pitch rises by
//! the same factor. The pitch shift is an accepted artifact of this
//! design (see DESIGN.md), not something this module compensates for.

use std::cmp;
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::audio;
use crate::error::{ReplaceError, Result};

/// Compress `input_wav` in time by `factor` (>= 1.0) and write the
/// result to `output_wav`. Returns the adjusted duration in seconds.
pub fn compress_tempo(input_wav: &Path, factor: f64, output_wav: &Path) -> Result<f64> {
    if factor < 1.0 {
        return Err(ReplaceError::AudioProcessing(format!(
            "tempo factor must be >= 1.0, got {}",
            factor
        )));
    }

    let (samples, sample_rate) = audio::read_wav_mono(input_wav)?;
    if samples.is_empty() {
        return Err(ReplaceError::AudioProcessing(format!(
            "input audio is empty: {}",
            input_wav.display()
        )));
    }

    let source_duration = audio::duration_in_seconds(samples.len(), sample_rate);
    let compressed = if factor == 1.0 {
        samples
    } else {
        resample_by_ratio(&samples, 1.0 / factor, sample_rate)?
    };

    audio::write_wav_mono(&compressed, sample_rate, output_wav)?;

    let duration = audio::duration_in_seconds(compressed.len(), sample_rate);
    log::info!("tempo x{:.2}: {:.3}s -> {:.3}s", factor, source_duration, duration);

    Ok(duration)
}

/// Resample mono samples by `ratio` (< 1.0 shortens) using a sinc
/// resampler, processing in fixed-size blocks.
fn resample_by_ratio(input: &[f32], ratio: f64, sample_rate: u32) -> Result<Vec<f32>> {
    // Block size adapted to the input length, as short inputs otherwise
    // drown in resampler latency.
    let duration_seconds = input.len() as f64 / sample_rate as f64;
    let block_size = if duration_seconds < 0.1 {
        64
    } else if duration_seconds < 0.5 {
        128
    } else if duration_seconds < 2.0 {
        256
    } else {
        512
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, block_size, 1)
        .map_err(|e| ReplaceError::AudioProcessing(format!("resampler init failed: {}", e)))?;

    let expected_len = (input.len() as f64 * ratio).round() as usize;
    let mut output = Vec::with_capacity(expected_len + block_size);

    let mut idx = 0;
    while idx < input.len() {
        let chunk_size = cmp::min(block_size, input.len() - idx);

        // The fixed-input resampler wants full blocks; pad the tail with
        // zeros and trim the excess below.
        let chunk = if chunk_size < block_size {
            let mut padded = vec![0.0f32; block_size];
            padded[..chunk_size].copy_from_slice(&input[idx..idx + chunk_size]);
            padded
        } else {
            input[idx..idx + chunk_size].to_vec()
        };

        let frames = vec![chunk];
        let processed = resampler
            .process(&frames, None)
            .map_err(|e| ReplaceError::AudioProcessing(format!("resampling failed: {}", e)))?;
        output.extend_from_slice(&processed[0]);

        idx += chunk_size;
    }

    // Padding and resampler delay leave the output slightly off the
    // arithmetic length; pin it so duration / factor holds exactly.
    if output.len() > expected_len {
        output.truncate(expected_len);
    } else {
        output.resize(expected_len, 0.0);
    }

    Ok(output)
}
