//! Chat response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Flag set when the request carried no utterance.
pub const EMPTY_QUERY_FLAG: &str = "empty_query";

/// Flag set when history loading or generation failed.
pub const BACKEND_ERROR_FLAG: &str = "backend_error";

/// Safety annotation attached to every reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Safety {
    /// False when the reply is a canned apology.
    pub ok: bool,
    /// Machine-readable reasons for `ok = false`.
    pub flags: Vec<String>,
}

impl Safety {
    /// A generated reply with no flags.
    pub fn ok() -> Self {
        Self {
            ok: true,
            flags: Vec::new(),
        }
    }

    /// A canned reply carrying a single flag.
    pub fn flagged(flag: &str) -> Self {
        Self {
            ok: false,
            flags: vec![flag.to_owned()],
        }
    }
}

/// Metadata describing how the reply was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatMeta {
    pub model: String,
    pub provider: String,
    /// True when grounding snippets contributed to the system prompt.
    pub used_grounding: bool,
    pub language: String,
    pub client: String,
}

/// Body returned by the chat endpoint on success and failure alike.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatResponse {
    /// Text shown to the user.
    pub reply: String,
    pub safety: Safety,
    pub meta: ChatMeta,
}
