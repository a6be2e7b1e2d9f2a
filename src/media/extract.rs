//! Media extraction: probe the source container and isolate its audio
//! track as a standalone PCM file.

use std::path::Path;

use crate::error::{ReplaceError, Result};
use crate::utils::ffmpeg::{run_ffmpeg_command, run_ffprobe_command};

/// Probed facts about the source video.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    /// Container duration in seconds.
    pub duration: f64,
    /// Whether the container carries at least one audio stream.
    pub has_audio: bool,
}

/// Probe the source container. Fails with [`ReplaceError::MediaRead`] if
/// the container cannot be decoded or carries no audio track.
pub fn probe_video(video_path: &Path) -> Result<VideoInfo> {
    let path = path_str(video_path)?;

    let duration_out = run_ffprobe_command(&[
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "default=noprint_wrappers=1:nokey=1",
        path,
    ])
    .map_err(|e| ReplaceError::MediaRead(format!("cannot probe {}: {}", path, e)))?;

    let duration = duration_out.trim().parse::<f64>().map_err(|_| {
        ReplaceError::MediaRead(format!("cannot parse duration of {}: {:?}", path, duration_out))
    })?;

    let streams_out = run_ffprobe_command(&[
        "-v",
        "error",
        "-select_streams",
        "a",
        "-show_entries",
        "stream=index",
        "-of",
        "csv=p=0",
        path,
    ])
    .map_err(|e| ReplaceError::MediaRead(format!("cannot probe streams of {}: {}", path, e)))?;

    let has_audio = !streams_out.trim().is_empty();
    if !has_audio {
        return Err(ReplaceError::MediaRead(format!("{} has no audio track", path)));
    }

    log::info!("source video {}: {:.3}s", path, duration);
    Ok(VideoInfo { duration, has_audio })
}

/// Extract the audio track as a mono PCM WAV at `sample_rate`.
pub fn extract_audio(video_path: &Path, output_wav: &Path, sample_rate: u32) -> Result<()> {
    let input = path_str(video_path)?;
    let output = path_str(output_wav)?;
    let rate = sample_rate.to_string();

    run_ffmpeg_command(&[
        "-i",
        input,
        "-vn",
        "-acodec",
        "pcm_s16le",
        "-ar",
        &rate,
        "-ac",
        "1",
        "-y",
        output,
    ])
    .map_err(|e| ReplaceError::MediaRead(format!("audio extraction failed: {}", e)))
}

pub(crate) fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| ReplaceError::MediaRead(format!("non-UTF8 path: {}", path.display())))
}
