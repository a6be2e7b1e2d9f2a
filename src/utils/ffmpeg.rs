//! FFmpeg/FFprobe subprocess wrappers.
//!
//! All container-level media work goes through the ffmpeg binaries; the
//! crate never links a media library directly.

use std::process::Command;

use crate::error::{ReplaceError, Result};

/// Check that an ffmpeg binary is reachable on PATH.
pub fn check_ffmpeg_installed() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run an ffmpeg command. The tail of stderr is folded into the error
/// message on failure so the caller sees the actual codec complaint.
pub fn run_ffmpeg_command(args: &[&str]) -> Result<()> {
    log::debug!("ffmpeg {}", args.join(" "));
    let output = Command::new("ffmpeg").args(args).output()?;

    if !output.status.success() {
        return Err(ReplaceError::from(format!(
            "ffmpeg failed with status {}: {}",
            output.status,
            stderr_tail(&output.stderr)
        )));
    }

    Ok(())
}

/// Run an ffprobe command and return its stdout.
pub fn run_ffprobe_command(args: &[&str]) -> Result<String> {
    log::debug!("ffprobe {}", args.join(" "));
    let output = Command::new("ffprobe").args(args).output()?;

    if !output.status.success() {
        return Err(ReplaceError::from(format!(
            "ffprobe failed with status {}: {}",
            output.status,
            stderr_tail(&output.stderr)
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

// Last few lines of stderr; ffmpeg puts the relevant diagnostic there.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(4);
    lines[start..].join(" | ")
}
