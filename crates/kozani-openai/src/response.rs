//! Generation response types.

use serde::{Deserialize, Serialize};

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Result of a generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Text of the first completion, `None` when the provider returned nothing.
    pub content: Option<String>,
    /// Model that produced the completion.
    pub model: String,
    /// Why generation stopped, as reported by the provider.
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl GenerationResponse {
    /// Creates a response carrying the given text.
    pub fn new(model: impl Into<String>, content: Option<String>) -> Self {
        Self {
            content,
            model: model.into(),
            finish_reason: None,
            usage: None,
        }
    }

    /// Returns the trimmed completion text, `None` if missing or blank.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
