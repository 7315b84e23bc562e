//! YT-PDF - turn a YouTube video into a PDF of actionable notes
//!
//! This library extracts video metadata and audio with yt-dlp, transcribes the audio
//! with Whisper, asks a GPT model for structured insights, renders them to HTML and
//! converts that HTML into a PDF document.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod llm;
pub mod output;
pub mod pdf;
pub mod pipeline;
pub mod report;
pub mod transcribe;
pub mod utils;

pub use analysis::{ContentAnalysis, ContentAnalyzer, GptContentAnalyzer};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{is_valid_youtube_url, AudioArtifact, Chapter, VideoMetadata};
pub use output::{ConversionOutcome, PdfInfo, ProcessingStatus, StandardResponse};
pub use pdf::{PdfArtifact, PdfProducer};
pub use pipeline::ConversionPipeline;
pub use report::{GptReportRenderer, ReportRenderer};
pub use transcribe::{Transcriber, WhisperTranscriber};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Which side of the boundary a conversion failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or a policy ceiling (duration, size, transcript length)
    Validation,
    /// Anything else: network, model, rendering, filesystem
    Internal,
}

impl ErrorKind {
    /// Transport status a boundary layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Internal => 200,
        }
    }

    /// Process exit code used by the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Validation => 2,
            ErrorKind::Internal => 1,
        }
    }
}

/// Error types raised by the conversion pipeline
#[derive(thiserror::Error, Debug)]
pub enum ConversionError {
    #[error("Invalid YouTube URL provided: {0}")]
    InvalidUrl(String),

    #[error("Failed to extract video information: {0:#}")]
    MetadataFailed(anyhow::Error),

    #[error("Video duration ({duration}s) exceeds maximum allowed duration ({max}s)")]
    DurationExceeded { duration: u64, max: u64 },

    #[error("Failed to download audio: {0:#}")]
    AudioFailed(anyhow::Error),

    #[error("Audio file too large: {size} bytes (maximum {max} bytes)")]
    AudioTooLarge { size: u64, max: u64 },

    #[error("Failed to transcribe audio: {0:#}")]
    TranscriptionFailed(anyhow::Error),

    #[error("Transcript is too short or empty ({length} characters). The video might not have clear audio.")]
    TranscriptTooShort { length: usize },

    #[error("Failed to analyze content: {0:#}")]
    AnalysisFailed(anyhow::Error),

    #[error("Failed to create PDF: {0:#}")]
    PdfFailed(anyhow::Error),
}

impl ConversionError {
    /// Classify the failure; every stage up to transcription is a validation failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::InvalidUrl(_)
            | ConversionError::MetadataFailed(_)
            | ConversionError::DurationExceeded { .. }
            | ConversionError::AudioFailed(_)
            | ConversionError::AudioTooLarge { .. }
            | ConversionError::TranscriptionFailed(_)
            | ConversionError::TranscriptTooShort { .. } => ErrorKind::Validation,
            ConversionError::AnalysisFailed(_) | ConversionError::PdfFailed(_) => {
                ErrorKind::Internal
            }
        }
    }
}
