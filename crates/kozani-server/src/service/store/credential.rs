use std::fmt;

use async_trait::async_trait;
use kozani_postgres::PgClient;
use kozani_postgres::model::{NewUser, User};
use kozani_postgres::query::UserRepository;
use uuid::Uuid;

use super::TRACING_TARGET;
use crate::handler::Result;

/// A registered user together with the stored credential hash.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub phone: String,
    pub password_hash: String,
    pub name: Option<String>,
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            phone: user.phone,
            password_hash: user.password_hash,
            name: user.name,
        }
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("phone", &self.phone)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Lookup and registration of users by phone number.
///
/// Errors are HTTP handler errors, so constraint violations surface with
/// their mapped status.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Finds the user registered with `phone`.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserRecord>>;

    /// Registers a new user.
    async fn create(
        &self,
        phone: &str,
        password_hash: String,
        name: Option<String>,
    ) -> Result<UserRecord>;
}

/// [`CredentialStore`] backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pg_client: PgClient,
}

impl PgCredentialStore {
    /// Creates a store over the given pool.
    pub fn new(pg_client: PgClient) -> Self {
        Self { pg_client }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserRecord>> {
        let mut conn = self.pg_client.get_connection().await?;
        let user = conn.find_user_by_phone(phone).await?;
        Ok(user.map(UserRecord::from))
    }

    async fn create(
        &self,
        phone: &str,
        password_hash: String,
        name: Option<String>,
    ) -> Result<UserRecord> {
        let mut conn = self.pg_client.get_connection().await?;
        let user = conn
            .create_user(NewUser {
                phone: phone.to_owned(),
                password_hash,
                name,
            })
            .await?;

        tracing::info!(target: TRACING_TARGET, user_id = %user.id, "User registered");
        Ok(user.into())
    }
}
