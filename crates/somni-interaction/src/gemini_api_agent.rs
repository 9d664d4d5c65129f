//! GeminiApiAgent - the fast completion instance.
//!
//! Calls the Gemini REST API directly.
//! Configuration priority: ~/.config/somni/secret.json > environment variables

use crate::config::load_secret_config;
use async_trait::async_trait;
use reqwest::{header::HeaderValue, Client, StatusCode};
use serde::{Deserialize, Serialize};
use somni_core::capability::{CapabilityError, CompletionAgent};
use std::env;
use std::time::Duration;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Completion agent that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: String,
    model: String,
    system_instruction: Option<String>,
}

impl GeminiApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            system_instruction: None,
        }
    }

    /// Loads configuration from ~/.config/somni/secret.json or environment
    /// variables (GEMINI_API_KEY, GEMINI_MODEL_NAME).
    pub fn try_from_env() -> Result<Self, CapabilityError> {
        if let Ok(config) = load_secret_config() {
            if let Some(gemini) = config.gemini {
                let model = gemini
                    .model_name
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
                return Ok(Self::new(gemini.api_key, model));
            }
        }

        let api_key = env::var("GEMINI_API_KEY").map_err(|_| {
            CapabilityError::ExecutionFailed(
                "GEMINI_API_KEY not found in ~/.config/somni/secret.json or environment variables"
                    .into(),
            )
        })?;
        let model = env::var("GEMINI_MODEL_NAME").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Adds a system instruction that will be sent alongside every request.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    fn request_url(&self) -> String {
        format!(
            "{BASE_URL}/{model}:generateContent?key={api_key}",
            model = self.model,
            api_key = self.api_key
        )
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<String, CapabilityError> {
        let response = self
            .client
            .post(self.request_url())
            .json(body)
            .send()
            .await
            .map_err(|err| CapabilityError::Process {
                status_code: None,
                message: format!("Gemini API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
                retry_after: None,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            CapabilityError::Other(format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl CompletionAgent for GeminiApiAgent {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CapabilityError> {
        if prompt.trim().is_empty() {
            return Err(CapabilityError::ExecutionFailed(
                "Gemini request must include a non-empty prompt".into(),
            ));
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: self.system_instruction.as_ref().map(|text| Content {
                parts: vec![Part { text: text.clone() }],
            }),
        };

        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, CapabilityError> {
    let text = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        Err(CapabilityError::ExecutionFailed(
            "Gemini API returned no text in the response candidates".into(),
        ))
    } else {
        Ok(text)
    }
}

fn map_http_error(
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> CapabilityError {
    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    if let Some(delay) = retry_after {
        CapabilityError::process_with_retry_after(status.as_u16(), body, is_retryable, delay)
    } else {
        CapabilityError::Process {
            status_code: Some(status.as_u16()),
            message: body,
            is_retryable,
            retry_after: None,
        }
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.parse::<u64>().ok().map(Duration::from_secs)
}
