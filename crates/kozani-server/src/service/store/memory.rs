//! In-memory stores for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use kozani_postgres::types::MessageRole;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::conversation::turns_oldest_first;
use super::{ConversationStore, CredentialStore, StoredTurn, UserRecord};
use crate::handler::{self, ErrorKind};
use crate::{Error, Result};

/// [`ConversationStore`] kept in a map, with failure toggles and call counters.
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    turns: RwLock<HashMap<Uuid, Vec<StoredTurn>>>,
    fail_appends: AtomicBool,
    fail_reads: AtomicBool,
    appends: AtomicUsize,
    reads: AtomicUsize,
}

impl MemoryConversationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every append fail.
    pub fn with_failing_appends(self) -> Self {
        self.fail_appends.store(true, Ordering::SeqCst);
        self
    }

    /// Makes every read fail.
    pub fn with_failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    /// Pre-populates the history of a user, oldest first.
    pub async fn seed(&self, user_id: Uuid, turns: impl IntoIterator<Item = StoredTurn>) {
        self.turns
            .write()
            .await
            .entry(user_id)
            .or_default()
            .extend(turns);
    }

    /// Returns the full history of a user, oldest first.
    pub async fn history(&self, user_id: Uuid) -> Vec<StoredTurn> {
        self.turns
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of append calls, failed ones included.
    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    /// Number of read calls, failed ones included.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn append(&self, user_id: Uuid, role: MessageRole, content: &str) -> Result<()> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(Error::store("message insert rejected"));
        }

        self.turns
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(StoredTurn::new(role, content));
        Ok(())
    }

    async fn recent(&self, user_id: Uuid, limit: usize) -> Result<Vec<StoredTurn>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::store("history query rejected"));
        }

        // Same shape as the `created_at DESC LIMIT n` query.
        let turns = self.turns.read().await;
        let newest_first: Vec<StoredTurn> = turns
            .get(&user_id)
            .map(|history| history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default();
        Ok(turns_oldest_first(newest_first))
    }
}

/// [`CredentialStore`] kept in a map keyed by phone number.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, UserRecord>>,
    fail: AtomicBool,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with an internal error.
    pub fn with_failures(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    /// Returns the number of registered users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns the user registered with `phone`.
    pub async fn get(&self, phone: &str) -> Option<UserRecord> {
        self.users.read().await.get(phone).cloned()
    }

    fn check(&self) -> handler::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ErrorKind::InternalServerError.with_context("credential store unavailable"));
        }

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_phone(&self, phone: &str) -> handler::Result<Option<UserRecord>> {
        self.check()?;
        Ok(self.get(phone).await)
    }

    async fn create(
        &self,
        phone: &str,
        password_hash: String,
        name: Option<String>,
    ) -> handler::Result<UserRecord> {
        self.check()?;

        let mut users = self.users.write().await;
        if users.contains_key(phone) {
            return Err(ErrorKind::Conflict
                .with_message("Phone number is already registered")
                .with_resource("user"));
        }

        let user = UserRecord {
            id: Uuid::new_v4(),
            phone: phone.to_owned(),
            password_hash,
            name,
        };
        users.insert(phone.to_owned(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recent_returns_tail_in_order() -> anyhow::Result<()> {
        let store = MemoryConversationStore::new();
        let user_id = Uuid::new_v4();
        store
            .seed(user_id, (0..12).map(|i| StoredTurn::user(format!("turn {i}"))))
            .await;

        let recent = store.recent(user_id, 8).await?;
        assert_eq!(recent.len(), 8);
        assert_eq!(recent[0].content, "turn 4");
        assert_eq!(recent[7].content, "turn 11");
        Ok(())
    }

    #[tokio::test]
    async fn reads_are_idempotent() -> anyhow::Result<()> {
        let store = MemoryConversationStore::new();
        let user_id = Uuid::new_v4();
        store
            .seed(
                user_id,
                [StoredTurn::user("hello"), StoredTurn::assistant("hi there")],
            )
            .await;

        let first = store.recent(user_id, 8).await?;
        let second = store.recent(user_id, 8).await?;
        assert_eq!(first, second);
        assert_eq!(store.read_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn appends_land_at_tail() -> anyhow::Result<()> {
        let store = MemoryConversationStore::new();
        let user_id = Uuid::new_v4();
        store.seed(user_id, [StoredTurn::assistant("earlier")]).await;

        store.append(user_id, MessageRole::User, "question").await?;
        store
            .append(user_id, MessageRole::Assistant, "answer")
            .await?;

        let recent = store.recent(user_id, 2).await?;
        assert_eq!(
            recent,
            [StoredTurn::user("question"), StoredTurn::assistant("answer")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn unknown_user_has_empty_history() -> anyhow::Result<()> {
        let store = MemoryConversationStore::new();
        assert!(store.recent(Uuid::new_v4(), 8).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failing_appends_report_errors() {
        let store = MemoryConversationStore::new().with_failing_appends();
        let result = store.append(Uuid::new_v4(), MessageRole::User, "x").await;
        assert!(result.is_err());
        assert_eq!(store.append_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_phone_conflicts() -> anyhow::Result<()> {
        let store = MemoryCredentialStore::new();
        store.create("0712", "hash".to_owned(), None).await?;

        let error = store
            .create("0712", "other".to_owned(), None)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(store.user_count().await, 1);
        Ok(())
    }
}
