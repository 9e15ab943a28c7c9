use async_trait::async_trait;
use kozani_postgres::PgClient;
use kozani_postgres::model::{Message, NewMessage};
use kozani_postgres::query::MessageRepository;
use kozani_postgres::types::MessageRole;
use uuid::Uuid;

use super::TRACING_TARGET;
use crate::Result;

/// A persisted conversation turn as seen by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTurn {
    pub role: MessageRole,
    pub content: String,
}

impl StoredTurn {
    /// Creates a turn with the given role.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

impl From<Message> for StoredTurn {
    fn from(message: Message) -> Self {
        Self::new(message.role, message.content)
    }
}

/// Puts a newest-first batch of rows back into conversation order.
pub(crate) fn turns_oldest_first<T>(newest_first: Vec<T>) -> Vec<StoredTurn>
where
    T: Into<StoredTurn>,
{
    newest_first.into_iter().rev().map(Into::into).collect()
}

/// Append-only conversation history keyed by user.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Appends one turn to the user's history.
    async fn append(&self, user_id: Uuid, role: MessageRole, content: &str) -> Result<()>;

    /// Returns up to `limit` of the most recent turns, oldest first.
    async fn recent(&self, user_id: Uuid, limit: usize) -> Result<Vec<StoredTurn>>;
}

/// [`ConversationStore`] backed by the `messages` table.
#[derive(Debug, Clone)]
pub struct PgConversationStore {
    pg_client: PgClient,
}

impl PgConversationStore {
    /// Creates a store over the given pool.
    pub fn new(pg_client: PgClient) -> Self {
        Self { pg_client }
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn append(&self, user_id: Uuid, role: MessageRole, content: &str) -> Result<()> {
        let mut conn = self.pg_client.get_connection().await?;
        let message = conn
            .create_message(NewMessage::new(user_id, role, content))
            .await?;

        tracing::debug!(
            target: TRACING_TARGET,
            user_id = %user_id,
            message_id = %message.id,
            role = %role,
            "Message appended"
        );

        Ok(())
    }

    async fn recent(&self, user_id: Uuid, limit: usize) -> Result<Vec<StoredTurn>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut conn = self.pg_client.get_connection().await?;
        let messages = conn.find_recent_messages(user_id, limit).await?;

        let turns = turns_oldest_first(messages);

        tracing::debug!(
            target: TRACING_TARGET,
            user_id = %user_id,
            count = turns.len(),
            "History loaded"
        );

        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(user_id: Uuid, role: MessageRole, content: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            user_id,
            role,
            content: content.to_owned(),
            created_at: jiff::Timestamp::now().into(),
        }
    }

    #[test]
    fn descending_rows_become_ascending_turns() {
        let user_id = Uuid::new_v4();
        let newest_first = vec![
            message(user_id, MessageRole::Assistant, "third"),
            message(user_id, MessageRole::User, "second"),
            message(user_id, MessageRole::Assistant, "first"),
        ];

        assert_eq!(
            turns_oldest_first(newest_first),
            vec![
                StoredTurn::assistant("first"),
                StoredTurn::user("second"),
                StoredTurn::assistant("third"),
            ]
        );
    }

    #[test]
    fn empty_batch_stays_empty() {
        assert!(turns_oldest_first(Vec::<Message>::new()).is_empty());
    }
}
