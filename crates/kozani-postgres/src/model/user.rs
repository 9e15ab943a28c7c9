//! User model for phone-identified accounts.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::users;

/// A phone-identified user.
///
/// Users are created on their first login and are read-only afterwards.
#[derive(Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Phone number used as the login identifier.
    pub phone: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Timestamp when the user was created.
    pub created_at: Timestamp,
}

/// Data for creating a new user.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    /// Phone number used as the login identifier.
    pub phone: String,
    /// Argon2id PHC string, never the plaintext password.
    pub password_hash: String,
    /// Optional display name.
    pub name: Option<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("phone", &self.phone)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
