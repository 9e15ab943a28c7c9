//! Users table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Users table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum UserConstraints {
    #[strum(serialize = "users_phone_not_empty")]
    PhoneNotEmpty,
    #[strum(serialize = "users_phone_length_max")]
    PhoneLengthMax,
    #[strum(serialize = "users_password_hash_not_empty")]
    PasswordHashNotEmpty,
    #[strum(serialize = "users_name_length_max")]
    NameLengthMax,

    #[strum(serialize = "users_phone_unique_idx")]
    PhoneUnique,
}

impl UserConstraints {
    /// Creates a new [`UserConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            UserConstraints::PhoneNotEmpty
            | UserConstraints::PhoneLengthMax
            | UserConstraints::PasswordHashNotEmpty
            | UserConstraints::NameLengthMax => ConstraintCategory::Validation,

            UserConstraints::PhoneUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<UserConstraints> for String {
    #[inline]
    fn from(val: UserConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for UserConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
