//! Pipeline configuration.
//!
//! Endpoints and credentials live here rather than in code; the external
//! collaborators are interchangeable behind their request/response
//! contracts.

use serde::{Deserialize, Serialize};

use crate::error::{ReplaceError, Result};

/// TTS model for the cloud engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TtsModel {
    Standard,
    HighDefinition,
}

impl Default for TtsModel {
    fn default() -> Self {
        Self::Standard
    }
}

impl TtsModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "tts-1",
            Self::HighDefinition => "tts-1-hd",
        }
    }
}

/// Voice for the cloud engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TtsVoice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Default for TtsVoice {
    fn default() -> Self {
        Self::Alloy
    }
}

impl TtsVoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
        }
    }
}

/// Which synthesis engine to construct for a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TtsEngine {
    /// Offline engine: espeak-ng subprocess writing a WAV directly.
    Espeak,
    /// Cloud engine: compressed speech audio, transcoded to WAV.
    OpenAi,
}

impl Default for TtsEngine {
    fn default() -> Self {
        Self::Espeak
    }
}

/// Configuration for a narration replacement run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacerConfig {
    /// API key shared by the recognition, correction and cloud synthesis
    /// collaborators.
    pub api_key: String,
    /// Speech recognition endpoint (audio in, text out).
    pub transcription_endpoint: String,
    /// Chat-style completion endpoint used for transcript correction.
    pub correction_endpoint: String,
    /// Model name sent to the correction endpoint.
    pub correction_model: String,
    /// Speech synthesis endpoint (cloud engine only).
    pub tts_endpoint: String,
    /// Synthesis engine to use.
    pub tts_engine: TtsEngine,
    /// Cloud TTS model.
    pub tts_model: TtsModel,
    /// Cloud TTS voice.
    pub tts_voice: TtsVoice,
    /// espeak-ng voice identifier (offline engine).
    pub espeak_voice: String,
    /// espeak-ng speaking rate in words per minute (offline engine).
    pub espeak_rate_wpm: u32,
    /// Tempo compression factor applied to the synthesized narration.
    /// Must be >= 1.0; the adjusted duration is `synthesized / factor`.
    pub tempo_factor: f64,
    /// Length of the terminal linear fade-out in seconds.
    pub fade_out_seconds: f64,
    /// Sample rate for extracted and generated waveforms.
    pub sample_rate: u32,
    /// Bounded timeout for each collaborator request, in seconds.
    pub request_timeout_secs: u64,
    /// Remove the run's intermediate artifacts when it finishes.
    pub cleanup_temp_files: bool,
}

impl Default for ReplacerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            transcription_endpoint: "https://api.openai.com/v1/audio/transcriptions".to_string(),
            correction_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            correction_model: "gpt-4o".to_string(),
            tts_endpoint: "https://api.openai.com/v1/audio/speech".to_string(),
            tts_engine: TtsEngine::default(),
            tts_model: TtsModel::default(),
            tts_voice: TtsVoice::default(),
            espeak_voice: "en".to_string(),
            espeak_rate_wpm: 140,
            tempo_factor: 1.1,
            fade_out_seconds: 1.0,
            sample_rate: 44_100,
            request_timeout_secs: 60,
            cleanup_temp_files: true,
        }
    }
}

impl ReplacerConfig {
    /// Validate the parts of the configuration the pipeline depends on.
    pub fn validate(&self) -> Result<()> {
        if self.tempo_factor < 1.0 {
            return Err(ReplaceError::Configuration(format!(
                "tempo_factor must be >= 1.0, got {}",
                self.tempo_factor
            )));
        }
        if self.fade_out_seconds < 0.0 {
            return Err(ReplaceError::Configuration(
                "fade_out_seconds must not be negative".to_string(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(ReplaceError::Configuration("sample_rate must be non-zero".to_string()));
        }
        if self.tts_engine == TtsEngine::OpenAi && self.api_key.trim().is_empty() {
            return Err(ReplaceError::Configuration(
                "an API key is required for the cloud synthesis engine".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ReplacerConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_slowdown_factor() {
        let config = ReplacerConfig {
            tempo_factor: 0.9,
            ..ReplacerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReplaceError::Configuration(_))
        ));
    }

    #[test]
    fn cloud_engine_requires_api_key() {
        let config = ReplacerConfig {
            tts_engine: TtsEngine::OpenAi,
            ..ReplacerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
