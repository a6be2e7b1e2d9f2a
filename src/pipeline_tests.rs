//! End-to-end pipeline tests with deterministic stub collaborators.
//!
//! Tests that need a real video are guarded on ffmpeg being installed;
//! everything else runs unconditionally.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::audio;
use crate::config::ReplacerConfig;
use crate::correct::TranscriptCorrector;
use crate::error::{ReplaceError, Result};
use crate::progress::ProgressUpdate;
use crate::transcribe::{Recognition, SpeechRecognizer};
use crate::tts::SpeechSynthesizer;
use crate::utils::ffmpeg::{check_ffmpeg_installed, run_ffmpeg_command};
use crate::NarrationReplacer;

struct StubRecognizer {
    outcome: Recognition,
}

#[async_trait]
impl SpeechRecognizer for StubRecognizer {
    async fn recognize(&self, _audio_path: &Path) -> Result<Recognition> {
        Ok(self.outcome.clone())
    }
}

/// `Some(reply)` answers with that text; `None` simulates an unreachable
/// correction service.
struct StubCorrector {
    reply: Option<String>,
}

#[async_trait]
impl TranscriptCorrector for StubCorrector {
    async fn correct(&self, _transcript: &str) -> Result<String> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ReplaceError::CorrectionService("stub service down".to_string())),
        }
    }
}

/// Writes a fixed-duration 440 Hz tone regardless of input text.
struct StubSynthesizer {
    seconds: f64,
    sample_rate: u32,
}

#[async_trait]
impl SpeechSynthesizer for StubSynthesizer {
    async fn synthesize(&self, _text: &str, output_wav: &Path) -> Result<()> {
        let count = (self.seconds * self.sample_rate as f64) as usize;
        let samples: Vec<f32> = (0..count)
            .map(|i| {
                (2.0 * std::f32::consts::PI * 440.0 * i as f32 / self.sample_rate as f32).sin()
                    * 0.5
            })
            .collect();
        audio::write_wav_mono(&samples, self.sample_rate, output_wav)
    }
}

fn stub_replacer(
    outcome: Recognition,
    correction: Option<&str>,
    synth_seconds: f64,
) -> NarrationReplacer {
    crate::utils::logger::init_logger();
    NarrationReplacer::with_collaborators(
        ReplacerConfig::default(),
        Box::new(StubRecognizer { outcome }),
        Box::new(StubCorrector {
            reply: correction.map(str::to_string),
        }),
        Box::new(StubSynthesizer {
            seconds: synth_seconds,
            sample_rate: 44_100,
        }),
    )
    .unwrap()
}

/// Render a small test video with a tone soundtrack.
fn make_test_video(dir: &Path, seconds: f64) -> PathBuf {
    let path = dir.join("source.mp4");
    let video_src = format!("testsrc=duration={}:size=128x72:rate=10", seconds);
    let audio_src = format!("sine=frequency=440:duration={}", seconds);
    run_ffmpeg_command(&[
        "-f",
        "lavfi",
        "-i",
        &video_src,
        "-f",
        "lavfi",
        "-i",
        &audio_src,
        "-c:v",
        "libx264",
        "-c:a",
        "aac",
        "-shortest",
        "-y",
        path.to_str().unwrap(),
    ])
    .unwrap();
    path
}

fn output_duration(path: &Path) -> f64 {
    crate::media::extract::probe_video(path).unwrap().duration
}

#[tokio::test]
async fn correction_fallback_keeps_transcript_exactly() {
    let replacer = stub_replacer(
        Recognition::Recognized("hello world um".to_string()),
        None,
        1.0,
    );

    let corrected = replacer.corrected_transcript("hello world um").await;
    assert_eq!(corrected, "hello world um");
}

#[tokio::test]
async fn missing_input_aborts_before_any_stage() {
    let replacer = stub_replacer(Recognition::Unintelligible, Some("x"), 1.0);
    let dir = tempfile::tempdir().unwrap();

    let result = replacer
        .process(
            Path::new("/nonexistent/clip.mp4"),
            &dir.path().join("final_output.mp4"),
            None,
        )
        .await;

    assert!(matches!(result, Err(ReplaceError::MediaRead(_))));
}

#[tokio::test]
async fn scenario_ten_second_video_with_corrected_narration() {
    if !check_ffmpeg_installed() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let source = make_test_video(dir.path(), 10.0);
    let output = dir.path().join("final_output.mp4");

    let replacer = stub_replacer(
        Recognition::Recognized("hello world um".to_string()),
        Some("hello world"),
        3.0,
    );

    let (tx, mut rx) = mpsc::channel(32);
    let report = replacer.process(&source, &output, Some(tx)).await.unwrap();

    assert_eq!(report.transcript, "hello world um");
    assert_eq!(report.corrected_transcript, "hello world");

    // 3.0s of narration at tempo 1.1 => 2.727s, and the video follows.
    let expected = 3.0 / 1.1;
    assert!(
        (report.narration_duration - expected).abs() < 0.01,
        "narration {:.3}s, expected {:.3}s",
        report.narration_duration,
        expected
    );
    assert!((report.output_duration - expected).abs() < 0.01);
    assert!((output_duration(&output) - expected).abs() < 0.2);

    // Stages were announced in order, start to finish.
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    assert_eq!(updates.first(), Some(&ProgressUpdate::Started));
    assert_eq!(updates.last(), Some(&ProgressUpdate::Finished));
    assert!(updates.contains(&ProgressUpdate::Resynchronizing));
}

#[tokio::test]
async fn unintelligible_audio_still_reaches_a_final_video() {
    if !check_ffmpeg_installed() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let source = make_test_video(dir.path(), 4.0);
    let output = dir.path().join("final_output.mp4");

    let replacer = stub_replacer(Recognition::Unintelligible, Some("unused"), 1.5);
    let report = replacer.process(&source, &output, None).await.unwrap();

    assert_eq!(report.transcript, "");
    assert!(output.exists());
    assert!(report.output_duration > 0.0);
}

#[tokio::test]
async fn narration_longer_than_source_is_clamped() {
    if !check_ffmpeg_installed() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let source = make_test_video(dir.path(), 2.0);
    let output = dir.path().join("final_output.mp4");

    // 3.3s of narration compresses to 3.0s, still past the 2.0s video.
    let replacer = stub_replacer(
        Recognition::Recognized("a long narration".to_string()),
        Some("a long narration"),
        3.3,
    );

    let report = replacer.process(&source, &output, None).await.unwrap();

    assert!(report.narration_duration > report.source_duration);
    assert!(
        (report.output_duration - report.source_duration).abs() < 0.05,
        "output {:.3}s should be clamped near the {:.3}s source",
        report.output_duration,
        report.source_duration
    );
}

#[tokio::test]
async fn identical_runs_produce_identical_durations() {
    if !check_ffmpeg_installed() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let source = make_test_video(dir.path(), 5.0);

    let mut durations = Vec::new();
    for name in ["first.mp4", "second.mp4"] {
        let replacer = stub_replacer(
            Recognition::Recognized("hello world um".to_string()),
            Some("hello world"),
            2.0,
        );
        let output = dir.path().join(name);
        let report = replacer.process(&source, &output, None).await.unwrap();
        durations.push(report.output_duration);
    }

    assert_eq!(durations[0], durations[1]);
}
