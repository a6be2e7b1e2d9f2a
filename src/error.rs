//! Error types for the narration replacement pipeline.
//!
//! Recognition and correction failures are not represented here: both are
//! recoverable by design and are modeled as result values
//! ([`crate::transcribe::Recognition`] and the pipeline's correction
//! fallback). Everything in this enum aborts the run.

use thiserror::Error;

/// Errors surfaced by the pipeline and its stages.
#[derive(Debug, Error)]
pub enum ReplaceError {
    /// The source container could not be decoded, probed, or has no
    /// audio track. Raised before any downstream stage runs.
    #[error("media read error: {0}")]
    MediaRead(String),

    /// The correction collaborator failed (transport, HTTP status, or a
    /// malformed response body). Non-fatal: the pipeline falls back to
    /// the uncorrected transcript.
    #[error("correction service error: {0}")]
    CorrectionService(String),

    /// Speech synthesis produced no usable audio. Fatal: with no audio
    /// there is nothing to resynchronize against.
    #[error("speech synthesis error: {0}")]
    Synthesis(String),

    /// The tempo adjuster could not read or process the synthesized
    /// audio. Fatal.
    #[error("audio processing error: {0}")]
    AudioProcessing(String),

    /// The final trim/fade/mux encode failed. Fatal: no partial output
    /// is considered valid.
    #[error("video encoding error: {0}")]
    Encoding(String),

    /// Invalid configuration (bad tempo factor, missing credential for a
    /// cloud engine, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// HTTP transport error.
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WAV encode/decode error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<&str> for ReplaceError {
    fn from(s: &str) -> Self {
        ReplaceError::Other(anyhow::anyhow!(s.to_string()))
    }
}

impl From<String> for ReplaceError {
    fn from(s: String) -> Self {
        ReplaceError::Other(anyhow::anyhow!(s))
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ReplaceError>;
