//! Progress updates for a pipeline run.

use tokio::sync::mpsc::Sender;

/// Progress update emitted as the pipeline moves through its stages.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// Run started, input validated.
    Started,
    /// Extracting the audio track from the source video.
    ExtractingAudio,
    /// Waiting on the recognition collaborator.
    Transcribing,
    /// Waiting on the correction collaborator.
    CorrectingTranscript,
    /// Synthesizing speech from the corrected transcript.
    GeneratingSpeech,
    /// Time-compressing the synthesized narration.
    AdjustingTempo,
    /// Trimming, fading and muxing the final video.
    Resynchronizing,
    /// Run finished; the final video exists.
    Finished,
}

/// Send a progress update if a sender is attached. Delivery is
/// best-effort; a closed receiver never fails the run.
pub async fn send_progress(sender: &Option<Sender<ProgressUpdate>>, update: ProgressUpdate) {
    if let Some(sender) = sender {
        let _ = sender.send(update).await;
    }
}
