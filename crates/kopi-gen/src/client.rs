//! Text-generation client for Cloudflare Workers AI.

use async_trait::async_trait;
use kopi_extract::ExtractError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prompts;

/// Workers AI REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "@cf/meta/llama-3.1-70b-instruct";

/// Errors that can occur while generating a component.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Workers AI API error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("AI generation failed: {0}")]
    Upstream(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Sends one generation prompt and returns the model's raw text.
#[async_trait]
pub trait Requester: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Connection settings for [`WorkersAiClient`].
#[derive(Debug, Clone)]
pub struct WorkersAiConfig {
    /// Cloudflare account ID
    pub account_id: String,

    /// API token with Workers AI access
    pub api_token: String,

    /// Model identifier, e.g. `@cf/meta/llama-3.1-70b-instruct`
    pub model: String,

    /// API base URL
    pub base_url: String,
}

impl WorkersAiConfig {
    pub fn new(account_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            api_token: api_token.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<RunResult>,
    #[serde(default)]
    errors: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    #[serde(default)]
    response: Value,
}

/// HTTP client for the Workers AI `ai/run` endpoint.
pub struct WorkersAiClient {
    config: WorkersAiConfig,
    http: reqwest::Client,
}

impl WorkersAiClient {
    pub fn new(config: WorkersAiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_id,
            self.config.model
        )
    }
}

#[async_trait]
impl Requester for WorkersAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let user = prompts::user_prompt(prompt);
        let body = RunRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompts::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
        };

        tracing::debug!("Requesting component from {}", self.config.model);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GenerateError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: RunResponse = serde_json::from_str(&text)?;
        if !envelope.success {
            return Err(GenerateError::Upstream(Value::Array(envelope.errors).to_string()));
        }

        // Some models hand back an already-decoded object instead of text.
        let raw = match envelope.result.map(|r| r.response) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Ok(raw)
    }
}
