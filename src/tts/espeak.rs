//! Offline synthesis through an espeak-ng subprocess.

use std::path::Path;

use async_trait::async_trait;
use log::{info, warn};
use tokio::process::Command;

use crate::audio;
use crate::error::{ReplaceError, Result};
use crate::tts::SpeechSynthesizer;

/// Duration of the silent artifact produced for empty input text.
const EMPTY_TEXT_SILENCE_SECS: f64 = 0.5;

/// Offline engine driving the espeak-ng binary. Writes a playback-ready
/// WAV directly; no conversion step needed.
pub struct EspeakSynthesizer {
    voice: String,
    rate_wpm: u32,
    sample_rate: u32,
}

impl EspeakSynthesizer {
    pub fn new(voice: &str, rate_wpm: u32, sample_rate: u32) -> Self {
        Self {
            voice: voice.to_string(),
            rate_wpm,
            sample_rate,
        }
    }

    async fn run_espeak(&self, binary: &str, text: &str, output_wav: &Path) -> std::io::Result<std::process::Output> {
        Command::new(binary)
            .arg("-v")
            .arg(&self.voice)
            .arg("-s")
            .arg(self.rate_wpm.to_string())
            .arg("-w")
            .arg(output_wav)
            .arg(text)
            .output()
            .await
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    async fn synthesize(&self, text: &str, output_wav: &Path) -> Result<()> {
        if text.trim().is_empty() {
            info!("empty transcript, writing a silent narration artifact");
            return audio::write_silent_wav(output_wav, EMPTY_TEXT_SILENCE_SECS, self.sample_rate);
        }

        info!("synthesizing {} characters with espeak-ng", text.len());
        let output = match self.run_espeak("espeak-ng", text, output_wav).await {
            Ok(output) => output,
            Err(first_err) => {
                // Some distributions ship the legacy binary name only.
                warn!("espeak-ng not runnable ({}), trying espeak", first_err);
                self.run_espeak("espeak", text, output_wav).await.map_err(|e| {
                    ReplaceError::Synthesis(format!("cannot run espeak-ng or espeak: {}", e))
                })?
            }
        };

        if !output.status.success() {
            return Err(ReplaceError::Synthesis(format!(
                "espeak exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let metadata = tokio::fs::metadata(output_wav).await.map_err(|e| {
            ReplaceError::Synthesis(format!("espeak produced no output file: {}", e))
        })?;
        if metadata.len() == 0 {
            return Err(ReplaceError::Synthesis("espeak produced an empty file".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_text_yields_a_valid_silent_wav() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated_audio.wav");

        let engine = EspeakSynthesizer::new("en", 140, 22_050);
        engine.synthesize("", &out).await.unwrap();

        let (samples, rate) = crate::audio::read_wav_mono(&out).unwrap();
        assert_eq!(rate, 22_050);
        assert!(!samples.is_empty());
        assert!(samples.iter().all(|&s| s.abs() < 1e-4));
    }

    #[tokio::test]
    async fn whitespace_text_counts_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated_audio.wav");

        let engine = EspeakSynthesizer::new("en", 140, 22_050);
        engine.synthesize("  \n ", &out).await.unwrap();
        assert!(out.exists());
    }
}
