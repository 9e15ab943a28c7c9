//! Database constraint violations organized by table.

mod messages;
mod users;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::messages::MessageConstraints;
pub use self::users::UserConstraints;

/// Unified constraint violation enum that can represent any known constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    User(UserConstraints),
    Message(MessageConstraints),
}

/// Categories of database constraint violations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Data validation constraints (format, length, range checks).
    Validation,
    /// Referential constraints (foreign keys).
    Referential,
    /// Uniqueness constraints (primary keys, unique indexes).
    Uniqueness,
}

impl ConstraintViolation {
    /// Creates a new [`ConstraintViolation`] from the constraint name.
    ///
    /// Returns `None` if the constraint name is not recognized.
    ///
    /// ```
    /// use kozani_postgres::types::ConstraintViolation;
    ///
    /// assert!(ConstraintViolation::new("users_phone_unique_idx").is_some());
    /// assert!(ConstraintViolation::new("unknown_constraint").is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        match constraint.split('_').next()? {
            "users" => UserConstraints::new(constraint).map(Self::User),
            "messages" => MessageConstraints::new(constraint).map(Self::Message),
            _ => None,
        }
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            Self::User(c) => c.categorize(),
            Self::Message(c) => c.categorize(),
        }
    }

    /// Returns the table name associated with this constraint.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::User(_) => "users",
            Self::Message(_) => "messages",
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(c) => write!(f, "{c}"),
            Self::Message(c) => write!(f, "{c}"),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_constraints() {
        let violation = ConstraintViolation::new("users_phone_unique_idx");
        assert_eq!(
            violation,
            Some(ConstraintViolation::User(UserConstraints::PhoneUnique))
        );
        assert_eq!(
            violation.map(|v| v.categorize()),
            Some(ConstraintCategory::Uniqueness)
        );

        let violation = ConstraintViolation::new("messages_user_id_fkey");
        assert_eq!(violation.map(|v| v.table_name()), Some("messages"));
    }

    #[test]
    fn rejects_unknown_constraints() {
        assert!(ConstraintViolation::new("accounts_email_unique").is_none());
        assert!(ConstraintViolation::new("").is_none());
    }
}
