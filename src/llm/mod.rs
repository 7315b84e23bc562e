use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::OpenAiConfig;
use crate::Result;

/// A single system + user exchange with a chat model
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    /// Ask the model for a JSON object response
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            json_mode: false,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// Generative text model used by the analyzer and the report renderer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Return the text content of the first completion choice
    async fn complete(&self, request: ChatRequest) -> Result<String>;
}

/// OpenAI-compatible `/chat/completions` client
pub struct OpenAiChat {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl OpenAiChat {
    pub fn new(client: Client, config: &OpenAiConfig) -> Self {
        Self {
            client,
            api_url: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.gpt_model.clone(),
            temperature: config.temperature,
        }
    }

    fn request_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": self.temperature,
        });

        if request.json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }

        body
    }
}

/// Pull the first choice's message content out of a chat-completions response
pub fn extract_content(response: &Value) -> Result<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid API response: {}", response))
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        tracing::debug!(model = %self.model, json_mode = request.json_mode, "Requesting chat completion");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(&request))
            .send()
            .await
            .context("Chat completion request failed")?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .context("Failed to read chat completion response")?;

        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            anyhow::bail!("Chat completion failed: HTTP {}: {}", status, message);
        }

        extract_content(&body)
    }
}
