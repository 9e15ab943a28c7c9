//! Message repository for append-only conversation history.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Message, NewMessage};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for conversation message operations.
pub trait MessageRepository {
    /// Appends one message to a user's history.
    fn create_message(
        &mut self,
        new_message: NewMessage,
    ) -> impl Future<Output = PgResult<Message>> + Send;

    /// Retrieves up to `limit` most recent messages, newest first.
    ///
    /// Ties on `created_at` are broken by descending id so that the order is
    /// stable across calls.
    fn find_recent_messages(
        &mut self,
        user_id: Uuid,
        limit: i64,
    ) -> impl Future<Output = PgResult<Vec<Message>>> + Send;
}

impl MessageRepository for PgConnection {
    async fn create_message(&mut self, new_message: NewMessage) -> PgResult<Message> {
        use schema::messages;

        diesel::insert_into(messages::table)
            .values(&new_message)
            .returning(Message::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_recent_messages(&mut self, user_id: Uuid, limit: i64) -> PgResult<Vec<Message>> {
        use schema::messages::{self, dsl};

        messages::table
            .filter(dsl::user_id.eq(user_id))
            .order((dsl::created_at.desc(), dsl::id.desc()))
            .limit(limit.max(0))
            .select(Message::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }
}
