//! Messages table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Messages table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum MessageConstraints {
    #[strum(serialize = "messages_user_id_fkey")]
    UserExists,
}

impl MessageConstraints {
    /// Creates a new [`MessageConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            MessageConstraints::UserExists => ConstraintCategory::Referential,
        }
    }
}

impl From<MessageConstraints> for String {
    #[inline]
    fn from(val: MessageConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for MessageConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
