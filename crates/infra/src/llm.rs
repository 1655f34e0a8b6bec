//! OpenAI-compatible chat-completions client.
//!
//! One client instance is built at startup and shared behind the `ai`
//! boundary traits; it is never re-created per call. The same endpoint
//! serves both summarization and customer queries.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use storekeep_ai::{AiError, Assistant, Summarizer};

const SUMMARY_SYSTEM_PROMPT: &str = "You are a store manager summarizing daily reports.";

const ASSISTANT_SYSTEM_PROMPT: &str = "You are an AI assistant for a retail store. \
    Respond to the customer's query based ONLY on the store's current inventory, \
    which is provided below. Do not assume or invent items that are not in the \
    inventory. If the query mentions an item not in stock, politely inform the \
    customer that it is not available. Provide details like quantity and price \
    for items in stock. Keep responses concise and professional.";

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Connection settings for the chat endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl LlmConfig {
    /// Read `LLM_BASE_URL`, `LLM_API_KEY`, `LLM_MODEL`. `None` when the
    /// endpoint or key is absent; the report path then fails
    /// `SummarizationUnavailable` instead of guessing.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("LLM_BASE_URL").ok()?;
        let api_key = std::env::var("LLM_API_KEY").ok()?;
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

pub struct ChatClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, AiError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Unavailable(format!("endpoint returned {status}")));
        }

        let payload: JsonValue = response
            .json()
            .await
            .map_err(|e| AiError::Unavailable(e.to_string()))?;
        extract_content(&payload)
    }
}

fn extract_content(payload: &JsonValue) -> Result<String, AiError> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            AiError::InvalidResponse("missing choices[0].message.content".to_string())
        })
}

#[async_trait]
impl Summarizer for ChatClient {
    async fn summarize(&self, text: &str) -> Result<String, AiError> {
        let prompt = format!("Generate a concise summary of this store report:\n{text}");
        self.chat(SUMMARY_SYSTEM_PROMPT, &prompt).await
    }
}

#[async_trait]
impl Assistant for ChatClient {
    async fn answer(&self, query: &str, inventory: &str) -> Result<String, AiError> {
        let system = format!("{ASSISTANT_SYSTEM_PROMPT}\n\nCurrent inventory:\n{inventory}");
        self.chat(&system, query).await
    }
}
