//! The conversion pipeline: URL → metadata → audio → transcript → analysis → HTML → PDF.
//!
//! Stages run strictly in sequence. Every call ends in a [`ConversionOutcome`] that
//! carries the elapsed time; failures additionally carry the [`ConversionError`]
//! so the caller can tell bad input from internal trouble. Downloaded audio is
//! removed on every exit path unless `storage.keep_audio` is set.

use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;

use crate::analysis::{ContentAnalysis, ContentAnalyzer, GptContentAnalyzer};
use crate::config::{Config, LimitsConfig};
use crate::extractors::{
    is_valid_youtube_url, AudioAcquirer, MetadataExtractor, VideoMetadata, YoutubeExtractor,
};
use crate::llm::{ChatModel, OpenAiChat};
use crate::output::ConversionOutcome;
use crate::pdf::{CommandPdfProducer, PdfArtifact, PdfProducer};
use crate::report::{GptReportRenderer, ReportRenderer};
use crate::transcribe::{Transcriber, WhisperTranscriber};
use crate::utils::round2;
use crate::{ConversionError, ErrorKind, Result};

/// Result of one pipeline call
pub type ConversionResult = std::result::Result<ConversionOutcome, ConversionFailure>;

/// A failed conversion: the cause plus the `failed` outcome to report
#[derive(Debug)]
pub struct ConversionFailure {
    pub error: ConversionError,
    pub outcome: ConversionOutcome,
}

impl ConversionFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl std::fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for ConversionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// External collaborators, one per stage
#[derive(Clone)]
pub struct Stages {
    pub extractor: Arc<dyn MetadataExtractor>,
    pub audio: Arc<dyn AudioAcquirer>,
    pub transcriber: Arc<dyn Transcriber>,
    pub analyzer: Arc<dyn ContentAnalyzer>,
    pub renderer: Arc<dyn ReportRenderer>,
    pub pdf: Arc<dyn PdfProducer>,
}

struct Converted {
    metadata: VideoMetadata,
    analysis: ContentAnalysis,
    pdf: PdfArtifact,
}

/// Main conversion pipeline
pub struct ConversionPipeline {
    stages: Stages,
    limits: LimitsConfig,
    keep_audio: bool,
}

impl ConversionPipeline {
    pub fn new(stages: Stages, limits: LimitsConfig) -> Self {
        Self {
            stages,
            limits,
            keep_audio: false,
        }
    }

    /// Keep downloaded audio on disk instead of removing it when the call ends
    pub fn keep_audio(mut self, keep: bool) -> Self {
        self.keep_audio = keep;
        self
    }

    /// Build the production pipeline: yt-dlp, Whisper, GPT and the configured PDF engine
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let youtube = Arc::new(YoutubeExtractor::new(&config.storage.upload_dir));
        let chat: Arc<dyn ChatModel> = Arc::new(OpenAiChat::new(client.clone(), &config.openai));

        let stages = Stages {
            extractor: youtube.clone(),
            audio: youtube,
            transcriber: Arc::new(WhisperTranscriber::new(client, &config.openai)),
            analyzer: Arc::new(GptContentAnalyzer::new(chat.clone())),
            renderer: Arc::new(GptReportRenderer::new(chat)),
            pdf: Arc::new(CommandPdfProducer::new(&config.pdf, config.pdf_dir())),
        };

        Ok(Self::new(stages, config.limits.clone()).keep_audio(config.storage.keep_audio))
    }

    /// Convert a YouTube video into a PDF report
    pub async fn convert(&self, url: &str) -> ConversionResult {
        let start_time = Instant::now();
        tracing::info!("Starting conversion for URL: {}", url);

        let result = self.run(url).await;
        let processing_time = round2(start_time.elapsed().as_secs_f64());

        match result {
            Ok(converted) => {
                tracing::info!("Conversion completed successfully in {}s", processing_time);
                Ok(ConversionOutcome::completed(
                    converted.metadata,
                    converted.pdf,
                    converted.analysis,
                    processing_time,
                ))
            }
            Err(error) => {
                match error.kind() {
                    ErrorKind::Validation => tracing::warn!("Validation error: {}", error),
                    ErrorKind::Internal => {
                        tracing::error!("Unexpected error during conversion: {}", error)
                    }
                }
                let outcome = ConversionOutcome::failed(&error, processing_time);
                Err(ConversionFailure { error, outcome })
            }
        }
    }

    async fn run(&self, url: &str) -> std::result::Result<Converted, ConversionError> {
        if !is_valid_youtube_url(url) {
            return Err(ConversionError::InvalidUrl(url.to_string()));
        }

        tracing::info!("Extracting video metadata...");
        let metadata = self
            .stages
            .extractor
            .extract_video_info(url)
            .await
            .map_err(ConversionError::MetadataFailed)?;
        self.check_duration(&metadata)?;

        tracing::info!("Downloading and processing audio...");
        let mut audio = self
            .stages
            .audio
            .download_audio(url, &metadata)
            .await
            .map_err(ConversionError::AudioFailed)?;

        if audio.size() > self.limits.max_file_size {
            let size = audio.size();
            audio.discard();
            return Err(ConversionError::AudioTooLarge {
                size,
                max: self.limits.max_file_size,
            });
        }
        if self.keep_audio {
            audio.persist();
        }

        tracing::info!("Transcribing audio...");
        let transcript = self
            .stages
            .transcriber
            .transcribe_audio(audio.path())
            .await
            .map_err(ConversionError::TranscriptionFailed)?;
        self.check_transcript(&transcript)?;

        tracing::info!("Analyzing content...");
        let analysis = self
            .stages
            .analyzer
            .analyze_content(&transcript, &metadata)
            .await
            .map_err(ConversionError::AnalysisFailed)?;

        tracing::info!("Generating report content...");
        let html = self.stages.renderer.render_report(&analysis, &metadata).await;

        tracing::info!("Creating PDF document...");
        let pdf = self
            .stages
            .pdf
            .generate_pdf(&html, &metadata)
            .await
            .map_err(ConversionError::PdfFailed)?;

        Ok(Converted {
            metadata,
            analysis,
            pdf,
        })
    }

    fn check_duration(&self, metadata: &VideoMetadata) -> std::result::Result<(), ConversionError> {
        match metadata.duration {
            Some(duration) if duration > self.limits.max_video_duration => {
                Err(ConversionError::DurationExceeded {
                    duration,
                    max: self.limits.max_video_duration,
                })
            }
            _ => Ok(()),
        }
    }

    fn check_transcript(&self, transcript: &str) -> std::result::Result<(), ConversionError> {
        let length = transcript.trim().chars().count();
        if length < self.limits.min_transcript_chars {
            return Err(ConversionError::TranscriptTooShort { length });
        }

        tracing::info!("Transcription completed. Length: {} characters", length);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MockContentAnalyzer;
    use crate::extractors::{AudioArtifact, MockAudioAcquirer, MockMetadataExtractor};
    use crate::llm::MockChatModel;
    use crate::output::ProcessingStatus;
    use crate::pdf::{pdf_filename, MockPdfProducer};
    use crate::report::{fallback_html, MockReportRenderer};
    use crate::transcribe::MockTranscriber;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn metadata(duration: u64) -> VideoMetadata {
        VideoMetadata {
            id: Some("dQw4w9WgXcQ".to_string()),
            title: Some("Ownership: explained".to_string()),
            duration: Some(duration),
            uploader: Some("Ferris".to_string()),
            ..Default::default()
        }
    }

    fn analysis() -> ContentAnalysis {
        ContentAnalysis {
            executive_summary: "Ownership in five minutes.".to_string(),
            key_concepts: vec!["Ownership".to_string()],
            actionable_insights: vec!["Borrow instead of clone".to_string()],
            important_quotes: vec![],
            resources_mentioned: vec![],
            step_by_step_guides: vec![],
            main_takeaways: vec!["One owner per value".to_string()],
            detailed_summary: "Details.".to_string(),
        }
    }

    fn pdf_for(metadata: &VideoMetadata) -> PdfArtifact {
        PdfArtifact {
            filename: pdf_filename(metadata),
            path: PathBuf::from("uploads/pdfs").join(pdf_filename(metadata)),
            file_size: 2048,
            file_size_mb: 0.0,
            created_at: 1_700_000_000.0,
        }
    }

    fn write_audio(dir: &Path, bytes: usize) -> PathBuf {
        let path = dir.join("audio.mp3");
        fs_err::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    struct Doubles {
        extractor: MockMetadataExtractor,
        audio: MockAudioAcquirer,
        transcriber: MockTranscriber,
        analyzer: MockContentAnalyzer,
        renderer: MockReportRenderer,
        pdf: MockPdfProducer,
    }

    impl Doubles {
        fn new() -> Self {
            Self {
                extractor: MockMetadataExtractor::new(),
                audio: MockAudioAcquirer::new(),
                transcriber: MockTranscriber::new(),
                analyzer: MockContentAnalyzer::new(),
                renderer: MockReportRenderer::new(),
                pdf: MockPdfProducer::new(),
            }
        }

        fn pipeline(self) -> ConversionPipeline {
            self.pipeline_with_renderer(None)
        }

        fn pipeline_with_renderer(self, renderer: Option<Arc<dyn ReportRenderer>>) -> ConversionPipeline {
            let stages = Stages {
                extractor: Arc::new(self.extractor),
                audio: Arc::new(self.audio),
                transcriber: Arc::new(self.transcriber),
                analyzer: Arc::new(self.analyzer),
                renderer: renderer.unwrap_or_else(|| Arc::new(self.renderer) as Arc<dyn ReportRenderer>),
                pdf: Arc::new(self.pdf),
            };
            ConversionPipeline::new(stages, LimitsConfig::default())
        }

        /// Wire every stage up to transcription to succeed
        fn through_transcription(&mut self, audio_path: PathBuf, transcript: &str) {
            self.extractor
                .expect_extract_video_info()
                .times(1)
                .returning(|_| Ok(metadata(212)));
            let size = fs_err::metadata(&audio_path).unwrap().len();
            self.audio
                .expect_download_audio()
                .times(1)
                .returning(move |_, _| Ok(AudioArtifact::new(audio_path.clone(), size)));
            let transcript = transcript.to_string();
            self.transcriber
                .expect_transcribe_audio()
                .times(1)
                .returning(move |_| Ok(transcript.clone()));
        }
    }

    fn long_transcript() -> String {
        "Today we talk about ownership and borrowing in Rust. ".repeat(4)
    }

    fn unwrap_failure(result: ConversionResult) -> ConversionFailure {
        match result {
            Ok(outcome) => panic!("expected failure, got {:?}", outcome.status),
            Err(failure) => failure,
        }
    }

    #[tokio::test]
    async fn test_successful_conversion() {
        let dir = TempDir::new().unwrap();
        let audio_path = write_audio(dir.path(), 1024);
        let mut doubles = Doubles::new();
        doubles.through_transcription(audio_path.clone(), &long_transcript());
        doubles
            .analyzer
            .expect_analyze_content()
            .withf(|transcript, metadata| {
                transcript.contains("ownership") && metadata.id.as_deref() == Some("dQw4w9WgXcQ")
            })
            .times(1)
            .returning(|_, _| Ok(analysis()));
        doubles
            .renderer
            .expect_render_report()
            .times(1)
            .returning(|_, _| "<h1>Notes</h1>".to_string());
        doubles
            .pdf
            .expect_generate_pdf()
            .withf(|html, _| html == "<h1>Notes</h1>")
            .times(1)
            .returning(|_, metadata| Ok(pdf_for(metadata)));

        let outcome = doubles.pipeline().convert(URL).await.unwrap();

        assert_eq!(outcome.status, ProcessingStatus::Completed);
        assert_eq!(outcome.message, "PDF generated successfully");
        assert_eq!(outcome.video_info, Some(metadata(212)));
        assert_eq!(outcome.analysis, Some(analysis()));
        assert_eq!(
            outcome.pdf_info.unwrap().filename,
            "Ownership_ explained_dQw4w9WgXcQ.pdf"
        );
        assert!(outcome.processing_time >= 0.0);
        assert!(!audio_path.exists(), "audio must be removed after success");
    }

    #[tokio::test]
    async fn test_invalid_url_touches_no_collaborator() {
        let failure = unwrap_failure(Doubles::new().pipeline().convert("https://vimeo.com/12345").await);

        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert!(matches!(failure.error, ConversionError::InvalidUrl(_)));
        assert_eq!(failure.outcome.status, ProcessingStatus::Failed);
        assert!(failure.outcome.processing_time >= 0.0);
    }

    #[tokio::test]
    async fn test_duration_ceiling_aborts_before_download() {
        let mut doubles = Doubles::new();
        doubles
            .extractor
            .expect_extract_video_info()
            .returning(|_| Ok(metadata(7201)));
        doubles.audio.expect_download_audio().never();

        let failure = unwrap_failure(doubles.pipeline().convert(URL).await);

        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert!(matches!(
            failure.error,
            ConversionError::DurationExceeded { duration: 7201, max: 7200 }
        ));
        assert!(failure.outcome.message.contains("exceeds maximum allowed duration"));
    }

    #[tokio::test]
    async fn test_duration_at_ceiling_is_allowed() {
        let mut doubles = Doubles::new();
        doubles
            .extractor
            .expect_extract_video_info()
            .returning(|_| Ok(metadata(7200)));
        doubles
            .audio
            .expect_download_audio()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("HTTP 403")));

        let failure = unwrap_failure(doubles.pipeline().convert(URL).await);

        assert!(matches!(failure.error, ConversionError::AudioFailed(_)));
        assert_eq!(failure.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_metadata_failure_is_validation_class() {
        let mut doubles = Doubles::new();
        doubles
            .extractor
            .expect_extract_video_info()
            .returning(|_| Err(anyhow::anyhow!("Video unavailable")));

        let failure = unwrap_failure(doubles.pipeline().convert(URL).await);

        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert_eq!(
            failure.outcome.message,
            "Conversion failed: Failed to extract video information: Video unavailable"
        );
    }

    #[tokio::test]
    async fn test_oversized_audio_is_deleted_before_transcription() {
        let dir = TempDir::new().unwrap();
        let audio_path = write_audio(dir.path(), 16);
        let mut doubles = Doubles::new();
        doubles
            .extractor
            .expect_extract_video_info()
            .returning(|_| Ok(metadata(60)));
        let returned = audio_path.clone();
        doubles
            .audio
            .expect_download_audio()
            .returning(move |_, _| Ok(AudioArtifact::new(returned.clone(), 200 * 1024 * 1024)));
        doubles.transcriber.expect_transcribe_audio().never();

        let failure = unwrap_failure(doubles.pipeline().convert(URL).await);

        assert!(matches!(failure.error, ConversionError::AudioTooLarge { .. }));
        assert!(!audio_path.exists());
    }

    #[tokio::test]
    async fn test_oversized_audio_is_deleted_even_when_keeping_audio() {
        let dir = TempDir::new().unwrap();
        let audio_path = write_audio(dir.path(), 16);
        let mut doubles = Doubles::new();
        doubles
            .extractor
            .expect_extract_video_info()
            .returning(|_| Ok(metadata(60)));
        let returned = audio_path.clone();
        doubles
            .audio
            .expect_download_audio()
            .returning(move |_, _| Ok(AudioArtifact::new(returned.clone(), u64::MAX)));

        let pipeline = doubles.pipeline().keep_audio(true);
        let failure = unwrap_failure(pipeline.convert(URL).await);

        assert!(matches!(failure.error, ConversionError::AudioTooLarge { .. }));
        assert!(!audio_path.exists());
    }

    #[tokio::test]
    async fn test_transcript_of_49_chars_is_rejected() {
        let dir = TempDir::new().unwrap();
        let audio_path = write_audio(dir.path(), 8);
        let mut doubles = Doubles::new();
        let transcript = format!("   {}\n", "a".repeat(49));
        doubles.through_transcription(audio_path.clone(), &transcript);
        doubles.analyzer.expect_analyze_content().never();

        let failure = unwrap_failure(doubles.pipeline().convert(URL).await);

        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert!(matches!(
            failure.error,
            ConversionError::TranscriptTooShort { length: 49 }
        ));
        assert!(failure.outcome.message.contains("might not have clear audio"));
        assert!(!audio_path.exists(), "audio must be removed after a validation failure");
    }

    #[tokio::test]
    async fn test_transcript_of_50_chars_proceeds_to_analysis() {
        let dir = TempDir::new().unwrap();
        let audio_path = write_audio(dir.path(), 8);
        let mut doubles = Doubles::new();
        doubles.through_transcription(audio_path, &format!("\n{}  ", "b".repeat(50)));
        doubles
            .analyzer
            .expect_analyze_content()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("model overloaded")));

        let failure = unwrap_failure(doubles.pipeline().convert(URL).await);

        assert!(matches!(failure.error, ConversionError::AnalysisFailed(_)));
        assert_eq!(failure.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_renderer_failure_still_produces_pdf_from_fallback() {
        let dir = TempDir::new().unwrap();
        let audio_path = write_audio(dir.path(), 8);
        let mut doubles = Doubles::new();
        doubles.through_transcription(audio_path, &long_transcript());
        doubles
            .analyzer
            .expect_analyze_content()
            .returning(|_, _| Ok(analysis()));
        let expected_html = fallback_html(&analysis(), &metadata(212));
        doubles
            .pdf
            .expect_generate_pdf()
            .withf(move |html, _| html == expected_html)
            .times(1)
            .returning(|_, metadata| Ok(pdf_for(metadata)));

        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .returning(|_| Err(anyhow::anyhow!("503 Service Unavailable")));
        let renderer: Arc<dyn ReportRenderer> = Arc::new(GptReportRenderer::new(Arc::new(model)));

        let outcome = doubles
            .pipeline_with_renderer(Some(renderer))
            .convert(URL)
            .await
            .unwrap();

        assert_eq!(outcome.status, ProcessingStatus::Completed);
    }

    #[tokio::test]
    async fn test_pdf_failure_is_internal_and_cleans_audio() {
        let dir = TempDir::new().unwrap();
        let audio_path = write_audio(dir.path(), 8);
        let mut doubles = Doubles::new();
        doubles.through_transcription(audio_path.clone(), &long_transcript());
        doubles
            .analyzer
            .expect_analyze_content()
            .returning(|_, _| Ok(analysis()));
        doubles
            .renderer
            .expect_render_report()
            .returning(|_, _| "<p>report</p>".to_string());
        doubles
            .pdf
            .expect_generate_pdf()
            .returning(|_, _| Err(anyhow::anyhow!("weasyprint: command not found")));

        let failure = unwrap_failure(doubles.pipeline().convert(URL).await);

        assert_eq!(failure.kind(), ErrorKind::Internal);
        assert_eq!(failure.outcome.status, ProcessingStatus::Failed);
        assert!(failure.outcome.message.starts_with("Conversion failed: Failed to create PDF"));
        assert!(failure.outcome.video_info.is_none());
        assert!(!audio_path.exists());
    }

    #[tokio::test]
    async fn test_keep_audio_preserves_file() {
        let dir = TempDir::new().unwrap();
        let audio_path = write_audio(dir.path(), 8);
        let mut doubles = Doubles::new();
        doubles.through_transcription(audio_path.clone(), "too short");

        let pipeline = doubles.pipeline().keep_audio(true);
        let failure = unwrap_failure(pipeline.convert(URL).await);

        assert!(matches!(failure.error, ConversionError::TranscriptTooShort { .. }));
        assert!(audio_path.exists());
    }

    #[tokio::test]
    async fn test_every_outcome_is_terminal() {
        let urls = ["not a url", "https://youtu.be/", "ftp://youtube.com/watch?v=x"];

        for url in urls {
            let failure = unwrap_failure(Doubles::new().pipeline().convert(url).await);
            assert!(failure.outcome.status.is_terminal());
            assert_eq!(failure.outcome.status, ProcessingStatus::Failed);
        }
    }
}
