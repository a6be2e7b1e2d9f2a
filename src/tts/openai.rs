//! Cloud synthesis through the OpenAI speech endpoint.
//!
//! The collaborator returns compressed MP3 audio; a ffmpeg transcode
//! step turns it into the mono WAV the rest of the pipeline expects.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{error, info, warn};
use reqwest::Client;
use serde::Serialize;

use crate::audio;
use crate::config::ReplacerConfig;
use crate::error::{ReplaceError, Result};
use crate::tts::SpeechSynthesizer;
use crate::utils::ffmpeg::run_ffmpeg_command;

const EMPTY_TEXT_SILENCE_SECS: f64 = 0.5;
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'a str,
}

/// Cloud engine: one speech request per run, bounded retries on
/// rate-limit and server errors.
pub struct OpenAiSynthesizer {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    voice: String,
    sample_rate: u32,
}

impl OpenAiSynthesizer {
    pub fn new(config: &ReplacerConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ReplaceError::Configuration(
                "an API key is required for the cloud synthesis engine".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.tts_endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.tts_model.as_str().to_string(),
            voice: config.tts_voice.as_str().to_string(),
            sample_rate: config.sample_rate,
        })
    }

    async fn fetch_speech(&self, text: &str) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: 1.0,
            response_format: "mp3",
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            info!("sending speech request (attempt {}/{})", attempts, MAX_ATTEMPTS);

            let response = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    let bytes = response.bytes().await?;
                    if bytes.is_empty() {
                        return Err(ReplaceError::Synthesis(
                            "speech service returned an empty body".to_string(),
                        ));
                    }
                    info!("received {} bytes of compressed speech", bytes.len());
                    return Ok(bytes.to_vec());
                }
                Ok(response) => {
                    let status = response.status();
                    let error_text = response.text().await.unwrap_or_default();
                    error!("speech service HTTP {}: {}", status, error_text);

                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if !retryable || attempts >= MAX_ATTEMPTS {
                        return Err(ReplaceError::Synthesis(format!(
                            "speech service returned HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    error!("speech request failed: {}", e);
                    if attempts >= MAX_ATTEMPTS {
                        return Err(ReplaceError::Synthesis(format!(
                            "cannot reach speech service: {}",
                            e
                        )));
                    }
                }
            }

            let wait = Duration::from_secs(2u64.pow(attempts));
            warn!("retrying speech request in {}s", wait.as_secs());
            tokio::time::sleep(wait).await;
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSynthesizer {
    async fn synthesize(&self, text: &str, output_wav: &Path) -> Result<()> {
        if text.trim().is_empty() {
            info!("empty transcript, writing a silent narration artifact");
            return audio::write_silent_wav(output_wav, EMPTY_TEXT_SILENCE_SECS, self.sample_rate);
        }

        let mp3_bytes = self.fetch_speech(text).await?;

        // Conversion step: compressed speech -> playback waveform.
        let mp3_path = output_wav.with_extension("mp3");
        tokio::fs::write(&mp3_path, &mp3_bytes).await?;

        let input = mp3_path
            .to_str()
            .ok_or_else(|| ReplaceError::Synthesis("non-UTF8 temp path".to_string()))?;
        let output = output_wav
            .to_str()
            .ok_or_else(|| ReplaceError::Synthesis("non-UTF8 output path".to_string()))?;
        let rate = self.sample_rate.to_string();

        run_ffmpeg_command(&[
            "-i", input, "-acodec", "pcm_s16le", "-ar", &rate, "-ac", "1", "-y", output,
        ])
        .map_err(|e| ReplaceError::Synthesis(format!("speech transcode failed: {}", e)))?;

        Ok(())
    }
}
