//! Resynchronization: trim the source video to the adjusted narration's
//! duration, apply the closing fade, and mux the narration in as the new
//! soundtrack.

use std::path::Path;

use crate::error::{ReplaceError, Result};
use crate::media::extract::path_str;
use crate::utils::ffmpeg::run_ffmpeg_command;

/// Clamp the target duration to the source video's length. The narration
/// is truncated rather than the video extended; extending would require
/// synthesizing frames the source never had.
pub fn clamp_to_source(audio_duration: f64, video_duration: f64) -> f64 {
    audio_duration.min(video_duration)
}

/// Fade-out window `(start, length)` for a clip of `duration` seconds.
/// Saturating: a clip shorter than the requested fade is faded over its
/// whole length.
pub fn fade_window(duration: f64, fade_seconds: f64) -> (f64, f64) {
    let length = fade_seconds.min(duration).max(0.0);
    let start = (duration - length).max(0.0);
    (start, length)
}

/// Produce the final video: `[0, d]` of the source, a linear fade-out
/// ending at `d`, and the adjusted narration as the only audio track,
/// encoded as H.264 + AAC in an MP4 container.
///
/// `d` is the adjusted audio duration clamped to the source duration.
/// Returns the output duration. Fails with [`ReplaceError::Encoding`];
/// no partial output is valid.
pub fn resynchronize(
    video_path: &Path,
    audio_path: &Path,
    output_path: &Path,
    video_duration: f64,
    audio_duration: f64,
    fade_seconds: f64,
) -> Result<f64> {
    let duration = clamp_to_source(audio_duration, video_duration);
    if audio_duration > video_duration {
        log::warn!(
            "narration ({:.3}s) outruns the source video ({:.3}s); truncating to the video",
            audio_duration,
            video_duration
        );
    }

    let (fade_start, fade_length) = fade_window(duration, fade_seconds);
    let duration_str = format!("{:.3}", duration);
    let fade_filter = format!("fade=t=out:st={:.3}:d={:.3}", fade_start, fade_length.max(0.001));

    let video = path_str(video_path)?;
    let audio = path_str(audio_path)?;
    let output = output_path
        .to_str()
        .ok_or_else(|| ReplaceError::Encoding(format!("non-UTF8 path: {}", output_path.display())))?;

    run_ffmpeg_command(&[
        "-i",
        video,
        "-i",
        audio,
        "-map",
        "0:v:0",
        "-map",
        "1:a:0",
        "-t",
        &duration_str,
        "-vf",
        &fade_filter,
        "-c:v",
        "libx264",
        "-c:a",
        "aac",
        "-shortest",
        "-y",
        output,
    ])
    .map_err(|e| ReplaceError::Encoding(format!("final encode failed: {}", e)))?;

    log::info!(
        "final video {}: {:.3}s, fade-out over the last {:.3}s",
        output,
        duration,
        fade_length
    );
    Ok(duration)
}
