//! Chat request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A grounding passage, either a bare string or an object with a `text` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Snippet {
    /// Plain passage text.
    Text(String),
    /// Passage with an optional source label.
    Passage {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
}

impl Snippet {
    /// Returns the passage text.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Passage { text, .. } => text,
        }
    }
}

/// Request payload for a chat turn.
///
/// `query` is optional at the wire level so that a missing utterance yields
/// the empty-query reply instead of a deserialization error.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChatRequest {
    /// The new user utterance.
    #[serde(default)]
    pub query: Option<String>,
    /// Grounding passages, joined in order.
    #[serde(default)]
    pub snippets: Vec<Snippet>,
    /// Language tag echoed in the response.
    #[serde(default = "default_language")]
    pub language: String,
    /// Opaque client identifier echoed in the response.
    #[serde(default = "default_client")]
    pub client: String,
    /// User whose history is loaded and extended.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

fn default_language() -> String {
    "en".to_owned()
}

fn default_client() -> String {
    "web".to_owned()
}

impl ChatRequest {
    /// Creates a request carrying only the utterance.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            snippets: Vec::new(),
            language: default_language(),
            client: default_client(),
            user_id: None,
        }
    }

    /// Links the request to a user.
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Adds a grounding passage.
    pub fn with_snippet(mut self, text: impl Into<String>) -> Self {
        self.snippets.push(Snippet::Text(text.into()));
        self
    }

    /// Returns the utterance, `None` when absent or whitespace-only.
    pub fn utterance(&self) -> Option<&str> {
        self.query.as_deref().filter(|query| !query.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() -> anyhow::Result<()> {
        let request: ChatRequest = serde_json::from_str("{}")?;
        assert_eq!(request.query, None);
        assert!(request.snippets.is_empty());
        assert_eq!(request.language, "en");
        assert_eq!(request.client, "web");
        assert_eq!(request.user_id, None);
        assert_eq!(request.utterance(), None);
        Ok(())
    }

    #[test]
    fn snippets_accept_strings_and_objects() -> anyhow::Result<()> {
        let request: ChatRequest = serde_json::from_str(
            r#"{"query": "hi", "snippets": ["first", {"text": "second", "source": "who"}]}"#,
        )?;
        let texts: Vec<&str> = request.snippets.iter().map(Snippet::text).collect();
        assert_eq!(texts, ["first", "second"]);
        Ok(())
    }

    #[test]
    fn whitespace_query_has_no_utterance() {
        let request = ChatRequest::new(" \t\n");
        assert_eq!(request.utterance(), None);
    }
}
