//! Message role enumeration for conversation turns.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Author of a single conversation turn.
///
/// Corresponds to the `MESSAGE_ROLE` PostgreSQL enum. The string forms match
/// the role names expected by chat-completion APIs.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::MessageRole"]
pub enum MessageRole {
    /// Turn written by the end user.
    #[db_rename = "user"]
    #[serde(rename = "user")]
    #[strum(serialize = "user")]
    User,

    /// Turn generated by the assistant.
    #[db_rename = "assistant"]
    #[serde(rename = "assistant")]
    #[strum(serialize = "assistant")]
    Assistant,
}

impl MessageRole {
    /// Returns the lowercase role name.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}
