//! ClaudeApiAgent - the higher-quality completion instance.
//!
//! Calls the Claude REST API directly.
//! Configuration priority: ~/.config/somni/secret.json > environment variables

use crate::config::load_secret_config;
use async_trait::async_trait;
use reqwest::{header::HeaderValue, Client, StatusCode};
use serde::{Deserialize, Serialize};
use somni_core::capability::{CapabilityError, CompletionAgent};
use std::env;
use std::time::Duration;

const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Completion agent that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeApiAgent {
    client: Client,
    api_key: String,
    model: String,
    system: Option<String>,
    max_tokens: u32,
}

impl ClaudeApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            system: None,
            max_tokens: 2048,
        }
    }

    /// Loads configuration from ~/.config/somni/secret.json or environment
    /// variables.
    ///
    /// Priority:
    /// 1. ~/.config/somni/secret.json
    /// 2. Environment variables (ANTHROPIC_API_KEY, CLAUDE_MODEL_NAME)
    pub fn try_from_env() -> Result<Self, CapabilityError> {
        if let Ok(config) = load_secret_config() {
            if let Some(claude) = config.claude {
                let model = claude
                    .model_name
                    .unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string());
                return Ok(Self::new(claude.api_key, model));
            }
        }

        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
            CapabilityError::ExecutionFailed(
                "ANTHROPIC_API_KEY not found in ~/.config/somni/secret.json or environment variables"
                    .into(),
            )
        })?;
        let model = env::var("CLAUDE_MODEL_NAME").unwrap_or_else(|_| DEFAULT_CLAUDE_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Adds a system prompt that will be sent alongside every request.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn send_request(&self, body: &CreateMessageRequest) -> Result<String, CapabilityError> {
        let response = self
            .client
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| CapabilityError::Process {
                status_code: None,
                message: format!("Claude API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
                retry_after: None,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: CreateMessageResponse = response.json().await.map_err(|err| {
            CapabilityError::Other(format!("Failed to parse Claude response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl CompletionAgent for ClaudeApiAgent {
    fn name(&self) -> &str {
        "claude"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CapabilityError> {
        if prompt.trim().is_empty() {
            return Err(CapabilityError::ExecutionFailed(
                "Claude request must include a non-empty prompt".into(),
            ));
        }

        let request = CreateMessageRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
            system: self.system.clone(),
        };

        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    r#type: String,
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> Result<String, CapabilityError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
        })
        .ok_or_else(|| {
            CapabilityError::ExecutionFailed(
                "Claude API returned no text in the response content".into(),
            )
        })
}

fn map_http_error(
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> CapabilityError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    if let Some(delay) = retry_after {
        CapabilityError::process_with_retry_after(status.as_u16(), message, is_retryable, delay)
    } else {
        CapabilityError::Process {
            status_code: Some(status.as_u16()),
            message,
            is_retryable,
            retry_after: None,
        }
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // Retry-After HTTP-date parsing is omitted for simplicity
    None
}
