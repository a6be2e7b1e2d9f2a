//! Transcript correction through a chat-style completion collaborator.
//!
//! One request, fixed system instruction, first choice taken verbatim.
//! Correction is best-effort: every failure here is caught by the
//! pipeline, which falls back to the uncorrected transcript.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ReplaceError, Result};

const CORRECTION_INSTRUCTION: &str =
    "Correct this transcription by removing grammatical errors and filler words \
     such as 'um' and 'hmm'. Reply with the corrected text only.";

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Correction collaborator: raw transcript in, corrected transcript out.
#[async_trait]
pub trait TranscriptCorrector: Send + Sync {
    async fn correct(&self, transcript: &str) -> Result<String>;
}

/// Chat-completions backed corrector.
pub struct ChatCorrector {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCorrector {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TranscriptCorrector for ChatCorrector {
    async fn correct(&self, transcript: &str) -> Result<String> {
        // Nothing to correct; the fallback invariant would return the
        // same value anyway, without a round-trip.
        if transcript.trim().is_empty() {
            return Ok(transcript.to_string());
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: CORRECTION_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: transcript.to_string(),
                },
            ],
            temperature: 0.3,
        };

        debug!("sending correction request to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ReplaceError::CorrectionService(format!("cannot reach correction service: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ReplaceError::CorrectionService(format!(
                "correction service returned HTTP {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletion = response.json().await.map_err(|e| {
            ReplaceError::CorrectionService(format!("malformed correction response: {}", e))
        })?;

        let corrected = completion
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                ReplaceError::CorrectionService("correction response has no choices".to_string())
            })?;

        info!("transcript corrected ({} -> {} chars)", transcript.len(), corrected.len());
        Ok(corrected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_wire_format_round_trips() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                { "message": { "role": "assistant", "content": "hello world" } }
            ]
        }"#;

        let completion: ChatCompletion = serde_json::from_str(body).unwrap();
        assert_eq!(completion.choices[0].message.content, "hello world");
    }

    #[test]
    fn no_choices_is_a_service_error() {
        let body = r#"{ "choices": [] }"#;
        let completion: ChatCompletion = serde_json::from_str(body).unwrap();
        assert!(completion.choices.first().is_none());
    }

    #[tokio::test]
    async fn empty_transcript_short_circuits() {
        // Endpoint is unreachable; the request must never be sent.
        let corrector = ChatCorrector::new(
            "http://127.0.0.1:9/v1/chat/completions",
            "test-key",
            "gpt-4o",
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(corrector.correct("").await.unwrap(), "");
        assert_eq!(corrector.correct("   ").await.unwrap(), "   ");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_correction_error() {
        let corrector = ChatCorrector::new(
            "http://127.0.0.1:9/v1/chat/completions",
            "test-key",
            "gpt-4o",
            Duration::from_secs(2),
        )
        .unwrap();

        let result = corrector.correct("hello world um").await;
        assert!(matches!(result, Err(ReplaceError::CorrectionService(_))));
    }
}
