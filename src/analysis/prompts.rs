pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an expert content analyst specializing in creating actionable insights and comprehensive notes from video transcripts. Your task is to analyze the provided transcript, video information and create structured, valuable content that can be used for learning and reference.

Focus on:
1. Key concepts and main ideas
2. Actionable takeaways and practical advice
3. Important quotes and insights
4. Step-by-step processes or methodologies mentioned
5. Resources, tools, or references mentioned
6. Summary of main points
"#;

pub const ANALYSIS_RESPONSE_SHAPE: &str = r#"{
  "executive_summary": "Provide a brief overview of the video in 2-3 sentences.",
  "key_concepts": [
    "List of key concepts"
  ],
  "actionable_insights": [
    "List specific and practical steps the viewer can take based on the content."
  ],
  "important_quotes": [
    "Include memorable or impactful quotes directly from the content."
  ],
  "resources_mentioned": [
    "List any tools, books, websites, or other resources referenced."
  ],
  "step_by_step_guides": [
    "List of step-by-step guides if any"
  ],
  "main_takeaways": [
    "Summarize the most important points for quick recall."
  ],
  "detailed_summary": "Provide a detailed summary of the video content."
}"#;
