//! Speech synthesis engines.
//!
//! Two interchangeable strategies behind one trait: an offline engine
//! writing a playback-ready waveform directly, and a cloud engine whose
//! compressed output is transcoded to a waveform afterwards. An engine
//! instance is constructed per run; there is no process-wide handle.

pub mod espeak;
pub mod openai;

use std::path::Path;

use async_trait::async_trait;

use crate::config::{ReplacerConfig, TtsEngine};
use crate::error::Result;

/// Capability "text -> speech audio file (WAV)".
///
/// Empty input text must still produce a valid, near-silent artifact so
/// downstream stages always have a well-formed file to operate on.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, output_wav: &Path) -> Result<()>;
}

/// Construct the synthesizer selected by the configuration.
pub fn for_engine(config: &ReplacerConfig) -> Result<Box<dyn SpeechSynthesizer>> {
    match config.tts_engine {
        TtsEngine::Espeak => Ok(Box::new(espeak::EspeakSynthesizer::new(
            &config.espeak_voice,
            config.espeak_rate_wpm,
            config.sample_rate,
        ))),
        TtsEngine::OpenAi => Ok(Box::new(openai::OpenAiSynthesizer::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TtsEngine;

    #[test]
    fn factory_builds_the_configured_engine() {
        let offline = ReplacerConfig::default();
        assert!(for_engine(&offline).is_ok());

        let cloud = ReplacerConfig {
            tts_engine: TtsEngine::OpenAi,
            api_key: "test-key".to_string(),
            ..ReplacerConfig::default()
        };
        assert!(for_engine(&cloud).is_ok());
    }
}
