//! OpenAI Provider Implementation
//!
//! Talks to any OpenAI-compatible `/v1/chat/completions` endpoint.
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - JSON mode (`response_format: json_object`) for structured extraction
//! - Rate-limit detection with `retry-after-ms` / `retry-after` hints
//! - Token usage reporting
//!
//! # Examples
//!
//! ```no_run
//! use docket_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("sk-...", "gpt-4o-mini")
//!     .unwrap()
//!     .with_endpoint("https://api.openai.com");
//! ```

use crate::{parse_retry_after, LlmError};
use docket_domain::{Completion, CompletionProvider, CompletionRequest, ResponseFormat, TokenUsage};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Connect timeout; the per-call deadline is enforced by the caller
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatBody>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormatBody {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl OpenAiProvider {
    /// Create a new provider against the default endpoint
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Auth`] for a blank key and
    /// [`LlmError::Communication`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Auth("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key,
            client,
        })
    }

    /// Create a provider reading the key from an environment variable
    pub fn from_env(key_var: &str, model: impl Into<String>) -> Result<Self, LlmError> {
        let key = std::env::var(key_var)
            .map_err(|_| LlmError::Auth(format!("Environment variable {} is not set", key_var)))?;
        Self::new(key, model)
    }

    /// Point the provider at a different OpenAI-compatible endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            response_format: match request.format {
                ResponseFormat::Json => Some(ResponseFormatBody { kind: "json_object" }),
                ResponseFormat::Text => None,
            },
        }
    }
}

/// Map a non-success HTTP status onto an [`LlmError`]
pub(crate) fn error_for_status(status: StatusCode, headers: &HeaderMap, body: &str) -> LlmError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
            retry_after: parse_retry_after(headers),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::Auth(format!("HTTP {}: {}", status, body))
        }
        StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(format!("HTTP {}: {}", status, body)),
        s if s.is_client_error() => LlmError::InvalidRequest(format!("HTTP {}: {}", status, body)),
        _ => LlmError::Communication(format!("HTTP {}: {}", status, body)),
    }
}

impl CompletionProvider for OpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(error_for_status(status, &headers, &error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        debug!("OpenAI response: {} chars", text.len());

        let completion = Completion::new(text);
        Ok(match chat.usage {
            Some(u) => completion.with_usage(TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
            None => completion,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAiProvider::new("sk-test", "gpt-4o-mini").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_blank_key_rejected() {
        let result = OpenAiProvider::new("  ", "gpt-4o-mini");
        assert!(matches!(result, Err(LlmError::Auth(_))));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let provider = OpenAiProvider::new("sk-test", "m")
            .unwrap()
            .with_endpoint("http://localhost:8000/");
        assert_eq!(provider.endpoint, "http://localhost:8000");
    }

    #[test]
    fn test_json_request_sets_response_format() {
        let provider = OpenAiProvider::new("sk-test", "m").unwrap();
        let request = CompletionRequest::json("hi");
        let body = serde_json::to_value(provider.body(&request)).unwrap();
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["content"], "hi");

        let request = CompletionRequest::text("hi");
        let body = serde_json::to_value(provider.body(&request)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_status_mapping() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("2"));

        let err = error_for_status(StatusCode::TOO_MANY_REQUESTS, &headers, "");
        assert!(matches!(
            err,
            LlmError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(2)
        ));

        let empty = HeaderMap::new();
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, &empty, ""),
            LlmError::Auth(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_REQUEST, &empty, ""),
            LlmError::InvalidRequest(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, &empty, ""),
            LlmError::Communication(_)
        ));
    }

    #[test]
    fn test_chat_response_parsing() {
        let raw = r#"{
            "choices": [{"message": {"content": "{\"risks\": []}"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some(r#"{"risks": []}"#));
        assert_eq!(parsed.usage.unwrap().prompt_tokens, 12);
    }

    #[tokio::test]
    async fn test_openai_error_handling() {
        // Invalid port to trigger a connection error
        let provider = OpenAiProvider::new("sk-test", "m")
            .unwrap()
            .with_endpoint("http://localhost:99999");

        let result = provider.complete(&CompletionRequest::json("test")).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
