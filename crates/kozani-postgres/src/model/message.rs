//! Message model for append-only conversation history.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::messages;
use crate::types::MessageRole;

/// A single conversation turn belonging to one user.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Message {
    /// Unique message identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Author of the turn.
    pub role: MessageRole,
    /// Free-text content.
    pub content: String,
    /// Creation timestamp, defines the conversation order.
    pub created_at: Timestamp,
}

/// Data for appending a new message.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewMessage {
    pub user_id: Uuid,
    pub role: MessageRole,
    pub content: String,
}

impl NewMessage {
    /// Creates a new message for the given user.
    pub fn new(user_id: Uuid, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            content: content.into(),
        }
    }
}
