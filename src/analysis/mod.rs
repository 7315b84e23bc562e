//! Structured insight extraction from a transcript.
//!
//! The analyzer asks a chat model for a JSON object. Output that does not parse
//! into [`ContentAnalysis`] is not an error: a fixed placeholder analysis carrying
//! the raw model output as its detailed summary is used instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod prompts;

use crate::extractors::VideoMetadata;
use crate::llm::{ChatModel, ChatRequest};
use crate::utils::truncate_chars;
use crate::Result;

use prompts::{ANALYSIS_RESPONSE_SHAPE, ANALYSIS_SYSTEM_PROMPT};

/// Characters of the video description included in the analysis prompt
const DESCRIPTION_PROMPT_CHARS: usize = 500;

/// Insights extracted from a video transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub executive_summary: String,
    #[serde(default)]
    pub key_concepts: Vec<String>,
    #[serde(default)]
    pub actionable_insights: Vec<String>,
    #[serde(default)]
    pub important_quotes: Vec<String>,
    #[serde(default)]
    pub resources_mentioned: Vec<String>,
    #[serde(default)]
    pub step_by_step_guides: Vec<String>,
    #[serde(default)]
    pub main_takeaways: Vec<String>,
    pub detailed_summary: String,
}

impl ContentAnalysis {
    /// Generic analysis used when the model output is not the expected JSON
    pub fn placeholder(raw_output: &str) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        Self {
            executive_summary:
                "Analysis completed successfully. Please refer to the detailed content below."
                    .to_string(),
            key_concepts: owned(&["Content analysis", "Video insights", "Learning materials"]),
            actionable_insights: owned(&[
                "Review the transcript for key information",
                "Apply insights from the video content",
            ]),
            important_quotes: Vec::new(),
            resources_mentioned: Vec::new(),
            step_by_step_guides: Vec::new(),
            main_takeaways: owned(&[
                "Video content has been analyzed",
                "Transcript provides valuable information",
                "Content can be used for learning purposes",
            ]),
            detailed_summary: raw_output.to_string(),
        }
    }

    /// Parse model output strictly, degrading to [`ContentAnalysis::placeholder`]
    pub fn parse_or_placeholder(raw_output: &str) -> Self {
        match serde_json::from_str::<ContentAnalysis>(raw_output.trim()) {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("Analysis response is not valid JSON ({}), using placeholder", e);
                Self::placeholder(raw_output)
            }
        }
    }
}

/// Extracts a [`ContentAnalysis`] from a transcript and its video metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze_content(
        &self,
        transcript: &str,
        metadata: &VideoMetadata,
    ) -> Result<ContentAnalysis>;
}

/// Analyzer backed by a chat model in JSON mode
pub struct GptContentAnalyzer {
    model: Arc<dyn ChatModel>,
}

impl GptContentAnalyzer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

/// Build the user prompt for the analysis request
pub fn build_analysis_prompt(metadata: &VideoMetadata, transcript: &str) -> String {
    let duration = metadata
        .duration
        .map(|d| d.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let description = truncate_chars(
        metadata.description.as_deref().unwrap_or("N/A"),
        DESCRIPTION_PROMPT_CHARS,
    );

    format!(
        "Please analyze the video information and transcript below and provide structured insights in JSON format as specified.\n\n\
         Video Information:\n\
         - Title: {title}\n\
         - Duration: {duration} seconds\n\
         - Uploader: {uploader}\n\
         - Description: {description}...\n\n\
         Transcript:\n\
         {transcript}\n\n\
         Please ensure the JSON structure is as follows:\n\n\
         {shape}\n",
        title = metadata.title_or("N/A"),
        duration = duration,
        uploader = metadata.uploader_or("N/A"),
        description = description,
        transcript = transcript,
        shape = ANALYSIS_RESPONSE_SHAPE,
    )
}

#[async_trait]
impl ContentAnalyzer for GptContentAnalyzer {
    async fn analyze_content(
        &self,
        transcript: &str,
        metadata: &VideoMetadata,
    ) -> Result<ContentAnalysis> {
        let request = ChatRequest::new(
            ANALYSIS_SYSTEM_PROMPT,
            build_analysis_prompt(metadata, transcript),
        )
        .json();

        let raw_output = self.model.complete(request).await?;
        let analysis = ContentAnalysis::parse_or_placeholder(&raw_output);

        tracing::info!(
            concepts = analysis.key_concepts.len(),
            insights = analysis.actionable_insights.len(),
            takeaways = analysis.main_takeaways.len(),
            "Analyzed content"
        );

        Ok(analysis)
    }
}
