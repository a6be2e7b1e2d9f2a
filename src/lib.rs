//! revoice — replace a video's narration with a synthesized voice
//! reading a grammar-corrected transcript of the original.
//!
//! The core is the resynchronization pipeline: extract the source audio,
//! transcribe it, correct the transcript, synthesize new speech, compress
//! its tempo, then trim the video to the narration's duration, fade it
//! out and mux the narration in as the new soundtrack. Stages run
//! strictly in order; recognition and correction degrade gracefully,
//! every other failure aborts the run.

pub mod audio;
pub mod config;
pub mod correct;
pub mod error;
pub mod media;
pub mod progress;
pub mod transcribe;
pub mod tts;
pub mod utils;

#[cfg(test)]
mod pipeline_tests;

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::mpsc::Sender;

use crate::config::ReplacerConfig;
use crate::correct::{ChatCorrector, TranscriptCorrector};
use crate::error::{ReplaceError, Result};
use crate::progress::{send_progress, ProgressUpdate};
use crate::transcribe::{OpenAiRecognizer, Recognition, SpeechRecognizer};
use crate::tts::SpeechSynthesizer;
use crate::utils::temp::RunWorkspace;

/// What a completed run produced.
#[derive(Debug)]
pub struct ReplacementReport {
    /// Path of the final video.
    pub output_path: PathBuf,
    /// Duration of the source video in seconds.
    pub source_duration: f64,
    /// Raw transcript; empty when recognition degraded.
    pub transcript: String,
    /// Corrected transcript; equals `transcript` when correction fell back.
    pub corrected_transcript: String,
    /// Duration of the tempo-adjusted narration in seconds.
    pub narration_duration: f64,
    /// Duration of the final video in seconds (narration clamped to the
    /// source).
    pub output_duration: f64,
}

/// Pipeline orchestrator. Owns one set of collaborator instances for its
/// lifetime; every `process` call gets a fresh artifact workspace.
pub struct NarrationReplacer {
    config: ReplacerConfig,
    recognizer: Box<dyn SpeechRecognizer>,
    corrector: Box<dyn TranscriptCorrector>,
    synthesizer: Box<dyn SpeechSynthesizer>,
}

impl NarrationReplacer {
    /// Build a replacer with the default collaborators for `config`.
    pub fn new(config: ReplacerConfig) -> Result<Self> {
        config.validate()?;
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let recognizer = Box::new(OpenAiRecognizer::new(
            &config.transcription_endpoint,
            &config.api_key,
            timeout,
        )?);
        let corrector = Box::new(ChatCorrector::new(
            &config.correction_endpoint,
            &config.api_key,
            &config.correction_model,
            timeout,
        )?);
        let synthesizer = tts::for_engine(&config)?;

        Ok(Self {
            config,
            recognizer,
            corrector,
            synthesizer,
        })
    }

    /// Build a replacer with injected collaborators.
    pub fn with_collaborators(
        config: ReplacerConfig,
        recognizer: Box<dyn SpeechRecognizer>,
        corrector: Box<dyn TranscriptCorrector>,
        synthesizer: Box<dyn SpeechSynthesizer>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            recognizer,
            corrector,
            synthesizer,
        })
    }

    /// Run the full pipeline on `video_path`, writing the final video to
    /// `output_path`.
    pub async fn process(
        &self,
        video_path: &Path,
        output_path: &Path,
        progress: Option<Sender<ProgressUpdate>>,
    ) -> Result<ReplacementReport> {
        info!("starting narration replacement for {}", video_path.display());

        if tokio::fs::metadata(video_path).await.is_err() {
            return Err(ReplaceError::MediaRead(format!(
                "input video not found: {}",
                video_path.display()
            )));
        }
        send_progress(&progress, ProgressUpdate::Started).await;

        let workspace = RunWorkspace::new(!self.config.cleanup_temp_files)?;

        // 1. Extract the audio track and probe the duration.
        send_progress(&progress, ProgressUpdate::ExtractingAudio).await;
        let source = media::extract::probe_video(video_path)?;
        let extracted_audio = workspace.artifact("extracted_audio", "wav");
        media::extract::extract_audio(video_path, &extracted_audio, self.config.sample_rate)?;

        // 2. Transcribe. Both failure classes degrade to empty narration.
        send_progress(&progress, ProgressUpdate::Transcribing).await;
        let outcome = self.recognizer.recognize(&extracted_audio).await?;
        match &outcome {
            Recognition::Recognized(_) => {}
            Recognition::Unintelligible => warn!("could not understand the audio"),
            Recognition::ServiceUnavailable(reason) => error!("recognition failed: {}", reason),
        }
        let transcript = outcome.into_text();

        // 3. Correct, falling back to the raw transcript on any failure.
        send_progress(&progress, ProgressUpdate::CorrectingTranscript).await;
        let corrected_transcript = self.corrected_transcript(&transcript).await;

        // 4. Synthesize the new narration.
        send_progress(&progress, ProgressUpdate::GeneratingSpeech).await;
        let generated_audio = workspace.artifact("generated_audio", "wav");
        self.synthesizer
            .synthesize(&corrected_transcript, &generated_audio)
            .await?;

        // 5. Compress the narration tempo.
        send_progress(&progress, ProgressUpdate::AdjustingTempo).await;
        let adjusted_audio = workspace.artifact("adjusted_audio", "wav");
        let narration_duration = audio::tempo::compress_tempo(
            &generated_audio,
            self.config.tempo_factor,
            &adjusted_audio,
        )?;

        // 6. Trim, fade and mux.
        send_progress(&progress, ProgressUpdate::Resynchronizing).await;
        let output_duration = media::resync::resynchronize(
            video_path,
            &adjusted_audio,
            output_path,
            source.duration,
            narration_duration,
            self.config.fade_out_seconds,
        )?;

        send_progress(&progress, ProgressUpdate::Finished).await;
        info!(
            "narration replacement finished: {} ({:.3}s)",
            output_path.display(),
            output_duration
        );

        Ok(ReplacementReport {
            output_path: output_path.to_path_buf(),
            source_duration: source.duration,
            transcript,
            corrected_transcript,
            narration_duration,
            output_duration,
        })
    }

    /// Correction with the fallback invariant: any collaborator failure
    /// yields the transcript unchanged.
    pub async fn corrected_transcript(&self, transcript: &str) -> String {
        match self.corrector.correct(transcript).await {
            Ok(corrected) => corrected,
            Err(e) => {
                error!("{}; keeping the uncorrected transcript", e);
                transcript.to_string()
            }
        }
    }
}

/// Convenience API: run the whole pipeline with default collaborators.
pub async fn replace_narration(
    video_path: &Path,
    output_path: &Path,
    api_key: &str,
) -> Result<ReplacementReport> {
    let config = ReplacerConfig {
        api_key: api_key.to_string(),
        ..ReplacerConfig::default()
    };

    let replacer = NarrationReplacer::new(config)?;
    replacer.process(video_path, output_path, None).await
}
