use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

pub mod style;

use crate::config::PdfConfig;
use crate::extractors::VideoMetadata;
use crate::report::escape_html;
use crate::utils::bytes_to_mb;
use crate::Result;

/// A generated PDF on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfArtifact {
    pub filename: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub file_size: u64,
    pub file_size_mb: f64,
    /// Unix timestamp in seconds
    pub created_at: f64,
}

/// Converts an HTML fragment into a PDF file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PdfProducer: Send + Sync {
    async fn generate_pdf(&self, html: &str, metadata: &VideoMetadata) -> Result<PdfArtifact>;
}

/// Deterministic PDF filename: `<sanitized title>_<video id>.pdf`
pub fn pdf_filename(metadata: &VideoMetadata) -> String {
    format!("{}.pdf", metadata.artifact_stem())
}

/// Wrap a report fragment into a printable HTML document
pub fn wrap_document(fragment: &str, title: &str, running_header: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{css}\n</style>\n</head>\n<body>\n{fragment}\n</body>\n</html>\n",
        title = escape_html(title),
        css = style::print_stylesheet(running_header),
        fragment = fragment,
    )
}

/// File statistics of a PDF that already exists
pub fn pdf_info(path: &Path) -> Result<PdfArtifact> {
    let metadata = fs_err::metadata(path)?;
    let created = metadata
        .created()
        .or_else(|_| metadata.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("PDF path has no file name")?;

    Ok(PdfArtifact {
        filename,
        path: path.to_path_buf(),
        file_size: metadata.len(),
        file_size_mb: bytes_to_mb(metadata.len()),
        created_at: created.timestamp_millis() as f64 / 1000.0,
    })
}

/// Producer that shells out to an HTML-to-PDF command such as WeasyPrint
pub struct CommandPdfProducer {
    engine: String,
    running_header: String,
    output_dir: PathBuf,
}

impl CommandPdfProducer {
    pub fn new(config: &PdfConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine: config.engine.clone(),
            running_header: config.running_header.clone(),
            output_dir: output_dir.into(),
        }
    }

    async fn run_engine(&self, input: &Path, output: &Path) -> Result<()> {
        tracing::debug!("Running {} {} {}", self.engine, input.display(), output.display());

        let result = Command::new(&self.engine)
            .arg(input)
            .arg(output)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.engine))?;

        if !result.status.success() {
            let error = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!("{} failed: {}", self.engine, error.trim());
        }

        Ok(())
    }
}

#[async_trait]
impl PdfProducer for CommandPdfProducer {
    async fn generate_pdf(&self, html: &str, metadata: &VideoMetadata) -> Result<PdfArtifact> {
        fs_err::create_dir_all(&self.output_dir)?;

        let document = wrap_document(html, metadata.title_or("Video Analysis"), &self.running_header);
        let source = tempfile::Builder::new()
            .prefix(".report-")
            .suffix(".html")
            .tempfile_in(&self.output_dir)?;
        fs_err::write(source.path(), document)?;

        // Render next to the final name, then rename into place in one step
        let rendered = tempfile::Builder::new()
            .prefix(".render-")
            .suffix(".pdf")
            .tempfile_in(&self.output_dir)?;
        self.run_engine(source.path(), rendered.path()).await?;

        let pdf_path = self.output_dir.join(pdf_filename(metadata));
        rendered
            .persist(&pdf_path)
            .with_context(|| format!("Failed to write {}", pdf_path.display()))?;

        let artifact = pdf_info(&pdf_path)?;
        tracing::info!(
            "Created PDF {} ({})",
            pdf_path.display(),
            crate::utils::format_file_size(artifact.file_size)
        );

        Ok(artifact)
    }
}
