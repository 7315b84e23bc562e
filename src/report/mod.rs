//! HTML report rendering.
//!
//! The primary path asks a chat model to lay the analysis out as an HTML fragment.
//! Any failure on that path falls back to a fixed template built from the analysis,
//! so rendering itself never fails.

use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::Arc;

pub mod prompts;

use crate::analysis::ContentAnalysis;
use crate::extractors::VideoMetadata;
use crate::llm::{ChatModel, ChatRequest};
use crate::utils::{format_duration, format_timestamp};
use crate::Result;

use prompts::{FALLBACK_STYLE, REPORT_SYSTEM_PROMPT};

/// Produces the HTML fragment that becomes the PDF body
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Always yields a document; failures are absorbed by the implementation
    async fn render_report(&self, analysis: &ContentAnalysis, metadata: &VideoMetadata) -> String;
}

/// Renderer that asks a chat model for the layout
pub struct GptReportRenderer {
    model: Arc<dyn ChatModel>,
}

impl GptReportRenderer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    async fn render_with_model(
        &self,
        analysis: &ContentAnalysis,
        metadata: &VideoMetadata,
    ) -> Result<String> {
        let request = ChatRequest::new(REPORT_SYSTEM_PROMPT, build_report_prompt(analysis, metadata)?);
        let html = strip_code_fences(&self.model.complete(request).await?);

        if html.is_empty() {
            anyhow::bail!("model returned an empty document");
        }

        Ok(html)
    }
}

#[async_trait]
impl ReportRenderer for GptReportRenderer {
    async fn render_report(&self, analysis: &ContentAnalysis, metadata: &VideoMetadata) -> String {
        match self.render_with_model(analysis, metadata).await {
            Ok(html) => {
                tracing::info!("Generated report HTML ({} bytes)", html.len());
                html
            }
            Err(e) => {
                tracing::warn!("Report generation failed, using fallback template: {:#}", e);
                fallback_html(analysis, metadata)
            }
        }
    }
}

/// Build the user prompt for the report layout request
pub fn build_report_prompt(analysis: &ContentAnalysis, metadata: &VideoMetadata) -> Result<String> {
    let duration = metadata
        .duration
        .map(|d| d.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let mut chapters = String::new();
    if !metadata.chapters.is_empty() {
        chapters.push_str("\nVideo Chapters:");
        for (i, chapter) in metadata.chapters.iter().enumerate() {
            let number = i + 1;
            let title = chapter
                .title
                .clone()
                .unwrap_or_else(|| format!("Chapter {}", number));
            write!(
                chapters,
                "\n  {}. {} ({} - {})",
                number,
                title,
                format_timestamp(chapter.start_time),
                format_timestamp(chapter.end_time)
            )?;
        }
        chapters.push('\n');
    }

    Ok(format!(
        "Create HTML content for a professional PDF document based on this video analysis:\n\n\
         Video Information:\n\
         - Title: {title}\n\
         - Duration: {duration} seconds\n\
         - Uploader: {uploader}\n\
         - Upload Date: {upload_date}\n\
         {chapters}\n\
         Analysis Data:\n\
         {analysis}\n\n\
         Create a comprehensive, well-formatted HTML document that includes all this information in a professional layout suitable for PDF conversion.\n",
        title = metadata.title_or("N/A"),
        duration = duration,
        uploader = metadata.uploader_or("N/A"),
        upload_date = metadata.upload_date.as_deref().unwrap_or("N/A"),
        chapters = chapters,
        analysis = serde_json::to_string_pretty(analysis)?,
    ))
}

/// Remove markdown code fences a model may wrap around its HTML
pub fn strip_code_fences(content: &str) -> String {
    let is_fence_line = |line: &str| {
        line.trim_end()
            .strip_prefix("```")
            .map(|lang| lang.chars().all(|c| c.is_alphanumeric() || c == '_'))
            .unwrap_or(false)
    };

    content
        .lines()
        .filter(|line| !is_fence_line(line))
        .collect::<Vec<_>>()
        .join("\n")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Escape text for inclusion in HTML element content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect()
}

fn or_default<'a>(text: &'a str, default: &'a str) -> &'a str {
    if text.trim().is_empty() {
        default
    } else {
        text
    }
}

/// Deterministic report built only from data already at hand
pub fn fallback_html(analysis: &ContentAnalysis, metadata: &VideoMetadata) -> String {
    format!(
        r#"{style}

<div class="header">
    <h1 class="title">{title}</h1>
    <div class="meta">
        <p>Duration: {duration} | Uploader: {uploader}</p>
    </div>
</div>

<div class="summary">
    <h2>Executive Summary</h2>
    <p>{summary}</p>
</div>

<div class="section">
    <h2>Main Takeaways</h2>
    <ul>{takeaways}</ul>
</div>

<div class="section">
    <h2>Key Concepts</h2>
    <ul>{concepts}</ul>
</div>

<div class="section">
    <h2>Actionable Insights</h2>
    <ul>{insights}</ul>
</div>

<div class="section">
    <h2>Detailed Summary</h2>
    <p>{detailed}</p>
</div>
"#,
        style = FALLBACK_STYLE,
        title = escape_html(metadata.title_or("Video Analysis")),
        duration = format_duration(metadata.duration),
        uploader = escape_html(metadata.uploader_or("Unknown")),
        summary = escape_html(or_default(
            &analysis.executive_summary,
            "Comprehensive analysis of video content."
        )),
        takeaways = list_items(&analysis.main_takeaways),
        concepts = list_items(&analysis.key_concepts),
        insights = list_items(&analysis.actionable_insights),
        detailed = escape_html(or_default(
            &analysis.detailed_summary,
            "Detailed analysis not available."
        )),
    )
}
