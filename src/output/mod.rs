use anyhow::Result;
use console::style;
use serde::{Deserialize, Serialize};

use crate::analysis::ContentAnalysis;
use crate::cli::OutputFormat;
use crate::extractors::VideoMetadata;
use crate::pdf::PdfArtifact;
use crate::pipeline::ConversionResult;
use crate::utils::{format_duration, format_file_size};
use crate::ErrorKind;

/// PDF statistics as reported to callers
pub type PdfInfo = PdfArtifact;

/// Processing statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// Declared for API compatibility; the synchronous pipeline never reports it
    Pending,
    /// Declared for API compatibility; the synchronous pipeline never reports it
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }
}

/// Terminal value of one conversion, success or failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub status: ProcessingStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_info: Option<VideoMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_info: Option<PdfInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ContentAnalysis>,
    /// Seconds from pipeline start to completion or failure
    pub processing_time: f64,
}

impl ConversionOutcome {
    pub fn completed(
        video_info: VideoMetadata,
        pdf_info: PdfInfo,
        analysis: ContentAnalysis,
        processing_time: f64,
    ) -> Self {
        Self {
            status: ProcessingStatus::Completed,
            message: "PDF generated successfully".to_string(),
            video_info: Some(video_info),
            pdf_info: Some(pdf_info),
            analysis: Some(analysis),
            processing_time,
        }
    }

    pub fn failed(error: &impl std::fmt::Display, processing_time: f64) -> Self {
        Self {
            status: ProcessingStatus::Failed,
            message: format!("Conversion failed: {}", error),
            video_info: None,
            pdf_info: None,
            analysis: None,
            processing_time,
        }
    }
}

/// Uniform envelope wrapping every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> StandardResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
        }
    }
}

/// What a boundary layer sends back for one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Transport status: 200 for completed and failed outcomes, 400 for rejections
    pub status_code: u16,
    pub error_kind: Option<ErrorKind>,
    pub body: StandardResponse<ConversionOutcome>,
}

impl Response {
    pub fn exit_code(&self) -> i32 {
        self.error_kind.map(|kind| kind.exit_code()).unwrap_or(0)
    }
}

/// Map a pipeline result onto the response envelope
///
/// Validation failures become client rejections; internal failures are reported
/// as a `failed` outcome inside an unsuccessful envelope.
pub fn respond(result: ConversionResult) -> Response {
    match result {
        Ok(outcome) => Response {
            status_code: 200,
            error_kind: None,
            body: StandardResponse::ok("YouTube video converted to PDF successfully", outcome),
        },
        Err(failure) => {
            let kind = failure.kind();
            let message = match kind {
                ErrorKind::Validation => failure.error.to_string(),
                ErrorKind::Internal => "Failed to convert YouTube video to PDF".to_string(),
            };
            Response {
                status_code: kind.status_code(),
                error_kind: Some(kind),
                body: StandardResponse::error(message, Some(failure.outcome)),
            }
        }
    }
}

/// Render a response in the requested format
pub fn render(response: &Response, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&response.body)?),
        OutputFormat::Text => Ok(format_as_text(response)),
    }
}

/// Print a response to the console
pub fn print_to_console(response: &Response, format: &OutputFormat) -> Result<()> {
    println!("{}", render(response, format)?);
    Ok(())
}

fn format_as_text(response: &Response) -> String {
    let mut lines = Vec::new();
    let body = &response.body;

    let headline = if body.success {
        style(&body.message).green().bold().to_string()
    } else {
        style(&body.message).red().bold().to_string()
    };
    lines.push(headline);

    if let Some(outcome) = &body.data {
        lines.push(format!("  {}", outcome.message));

        if let Some(video) = &outcome.video_info {
            lines.push(format!("  Video: {}", video.title_or("untitled")));
            lines.push(format!("  Duration: {}", format_duration(video.duration)));
        }

        if let Some(pdf) = &outcome.pdf_info {
            lines.push(format!(
                "  PDF: {} ({})",
                pdf.path.display(),
                format_file_size(pdf.file_size)
            ));
        }

        if let Some(analysis) = &outcome.analysis {
            lines.push(format!("  Summary: {}", analysis.executive_summary));
        }

        lines.push(format!("  Processing time: {:.2}s", outcome.processing_time));
    }

    lines.join("\n")
}
