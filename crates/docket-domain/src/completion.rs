//! Request and response values exchanged with a completion provider

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Output format hint passed to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Free-form text
    Text,
    /// A single JSON object
    #[default]
    Json,
}

/// A single completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Full prompt text
    pub prompt: String,

    /// Requested output format
    pub format: ResponseFormat,
}

impl CompletionRequest {
    /// Create a request that asks for a JSON object
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Json,
        }
    }

    /// Create a request that asks for plain text
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Text,
        }
    }
}

/// Token accounting reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u64,

    /// Tokens produced by the model
    pub completion_tokens: u64,
}

impl TokenUsage {
    /// Prompt plus completion tokens
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: TokenUsage) {
        *self = *self + rhs;
    }
}

/// Raw provider output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    /// Response text; may be empty, malformed or wrapped in prose
    pub text: String,

    /// Token usage, when the provider reports it
    pub usage: Option<TokenUsage>,
}

impl Completion {
    /// Completion with text only
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    /// Attach token usage
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_sums() {
        let mut total = TokenUsage::default();
        total += TokenUsage { prompt_tokens: 10, completion_tokens: 2 };
        total += TokenUsage { prompt_tokens: 5, completion_tokens: 1 };
        assert_eq!(total.prompt_tokens, 15);
        assert_eq!(total.completion_tokens, 3);
        assert_eq!(total.total(), 18);
    }

    #[test]
    fn test_request_constructors() {
        assert_eq!(CompletionRequest::json("p").format, ResponseFormat::Json);
        assert_eq!(CompletionRequest::text("p").format, ResponseFormat::Text);
    }
}
