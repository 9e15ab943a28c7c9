//! Chat-completions wire types.

use serde::{Deserialize, Serialize};

use crate::{GenerationResponse, TokenUsage, Turn, TurnRole};

#[derive(Debug, Serialize)]
pub(crate) struct CompletionBody<'a> {
    pub model: &'a str,
    pub messages: Vec<CompletionMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompletionMessage<'a> {
    pub role: TurnRole,
    pub content: &'a str,
}

impl<'a> From<&'a Turn> for CompletionMessage<'a> {
    fn from(turn: &'a Turn) -> Self {
        Self {
            role: turn.role,
            content: &turn.content,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionReply {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl CompletionReply {
    /// Keeps only the first choice.
    pub fn into_response(self, fallback_model: &str) -> GenerationResponse {
        let first = self.choices.into_iter().next();
        let finish_reason = first.as_ref().and_then(|c| c.finish_reason.clone());
        let content = first.and_then(|c| c.message).and_then(|m| m.content);

        GenerationResponse {
            content,
            model: self.model.unwrap_or_else(|| fallback_model.to_owned()),
            finish_reason,
            usage: self.usage.map(|usage| TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_choice() -> anyhow::Result<()> {
        let reply: CompletionReply = serde_json::from_str(
            r#"{
                "model": "gpt-4o-mini-2024",
                "choices": [
                    {"message": {"role": "assistant", "content": "First"}, "finish_reason": "stop"},
                    {"message": {"role": "assistant", "content": "Second"}}
                ],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            }"#,
        )?;

        let response = reply.into_response("gpt-4o-mini");
        assert_eq!(response.content.as_deref(), Some("First"));
        assert_eq!(response.model, "gpt-4o-mini-2024");
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.map(|u| u.completion_tokens), Some(3));
        Ok(())
    }

    #[test]
    fn missing_choices_yield_no_content() -> anyhow::Result<()> {
        let reply: CompletionReply = serde_json::from_str(r#"{"choices": []}"#)?;
        let response = reply.into_response("gpt-4o-mini");
        assert_eq!(response.content, None);
        assert_eq!(response.model, "gpt-4o-mini");

        let reply: CompletionReply =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#)?;
        assert_eq!(reply.into_response("m").text(), None);
        Ok(())
    }
}
