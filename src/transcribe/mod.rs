//! Speech recognition: audio in, plain text out.
//!
//! Both recognition failure classes are expected, recoverable outcomes,
//! so they are modeled as [`Recognition`] variants rather than errors.
//! The pipeline degrades them to an empty transcript and keeps going.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use crate::error::Result;

/// Outcome of a recognition attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    /// The collaborator produced a transcript.
    Recognized(String),
    /// Audio was delivered but no speech could be made out. Degrades to
    /// an empty transcript with a warning.
    Unintelligible,
    /// The collaborator could not be reached or answered with an error.
    /// Degrades to an empty transcript; an empty narration is an
    /// accepted outcome, not a hard stop.
    ServiceUnavailable(String),
}

impl Recognition {
    /// Transcript text for this outcome; empty for both degraded cases.
    pub fn into_text(self) -> String {
        match self {
            Recognition::Recognized(text) => text,
            Recognition::Unintelligible | Recognition::ServiceUnavailable(_) => String::new(),
        }
    }
}

/// Recognition collaborator: audio file in, [`Recognition`] out.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio_path: &Path) -> Result<Recognition>;
}

/// Hand-built multipart/form-data body, matching the exact field order
/// the transcription endpoint is known to accept.
#[derive(Debug)]
struct MultipartFormBuilder {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartFormBuilder {
    const DEFAULT_BOUNDARY: &'static str = "--------------------boundary";

    fn new() -> Self {
        Self {
            boundary: Self::DEFAULT_BOUNDARY.to_string(),
            body: Vec::new(),
        }
    }

    fn add_text(&mut self, name: &str, value: &str) -> &mut Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn add_file(&mut self, name: &str, filename: &str, content: &[u8], content_type: &str) -> &mut Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, filename
            )
            .as_bytes(),
        );
        self.body
            .extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(&mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        std::mem::take(&mut self.body)
    }

    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// Whisper-backed recognizer.
pub struct OpenAiRecognizer {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiRecognizer {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for OpenAiRecognizer {
    async fn recognize(&self, audio_path: &Path) -> Result<Recognition> {
        // A missing or unreadable artifact is a local fault, not a
        // collaborator outcome.
        let file_content = tokio::fs::read(audio_path).await?;
        let filename = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.wav".to_string());

        let mut form = MultipartFormBuilder::new();
        form.add_file("file", &filename, &file_content, "application/octet-stream");
        form.add_text("model", "whisper-1");
        form.add_text("response_format", "text");
        let content_type = form.content_type();
        let body = form.finish();

        info!("sending recognition request for {}", filename);
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return Ok(Recognition::ServiceUnavailable(format!(
                    "cannot reach recognition service: {}",
                    e
                )))
            }
        };

        let status = response.status();
        debug!("recognition response status: {}", status);
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Ok(Recognition::ServiceUnavailable(format!(
                "recognition service returned HTTP {}: {}",
                status, error_text
            )));
        }

        let text = match response.text().await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                return Ok(Recognition::ServiceUnavailable(format!(
                    "cannot read recognition response: {}",
                    e
                )))
            }
        };

        if text.is_empty() {
            return Ok(Recognition::Unintelligible);
        }

        info!("recognized {} characters of speech", text.len());
        Ok(Recognition::Recognized(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_outcomes_yield_empty_text() {
        assert_eq!(Recognition::Unintelligible.into_text(), "");
        assert_eq!(
            Recognition::ServiceUnavailable("down".to_string()).into_text(),
            ""
        );
        assert_eq!(
            Recognition::Recognized("hello world um".to_string()).into_text(),
            "hello world um"
        );
    }

    #[test]
    fn multipart_body_has_boundary_framing() {
        let mut form = MultipartFormBuilder::new();
        form.add_file("file", "clip.wav", b"RIFF", "application/octet-stream");
        form.add_text("model", "whisper-1");
        let content_type = form.content_type();
        let body = form.finish();
        let body_str = String::from_utf8_lossy(&body);

        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert!(body_str.contains("name=\"file\"; filename=\"clip.wav\""));
        assert!(body_str.contains("name=\"model\""));
        assert!(body_str.ends_with(&format!("--{}--\r\n", MultipartFormBuilder::DEFAULT_BOUNDARY)));
    }

    #[tokio::test]
    async fn unreachable_service_degrades_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("clip.wav");
        crate::audio::write_silent_wav(&audio, 0.1, 16_000).unwrap();

        // Connection refused locally; no network involved.
        let recognizer = OpenAiRecognizer::new(
            "http://127.0.0.1:9/v1/audio/transcriptions",
            "test-key",
            Duration::from_secs(2),
        )
        .unwrap();

        let outcome = recognizer.recognize(&audio).await.unwrap();
        assert!(matches!(outcome, Recognition::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn missing_audio_artifact_is_an_error() {
        let recognizer = OpenAiRecognizer::new(
            "http://127.0.0.1:9/v1/audio/transcriptions",
            "test-key",
            Duration::from_secs(2),
        )
        .unwrap();

        let result = recognizer.recognize(Path::new("/nonexistent/audio.wav")).await;
        assert!(result.is_err());
    }
}
