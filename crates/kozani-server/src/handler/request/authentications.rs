//! Authentication request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validations::{normalized_option, not_blank};

/// Request payload for login, registering the phone on first use.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct Login {
    /// Phone number identifying the user.
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 32))]
    pub phone: String,

    /// Plaintext password, never stored.
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 1000))]
    pub password: String,

    /// Optional display name, only used when registering.
    #[serde(default)]
    #[validate(length(max = 120))]
    pub name: Option<String>,
}

impl Login {
    /// Returns the phone number with surrounding whitespace removed.
    pub fn normalized_phone(&self) -> &str {
        self.phone.trim()
    }

    /// Returns the trimmed name, `None` when absent or blank.
    pub fn normalized_name(&self) -> Option<String> {
        normalized_option(self.name.as_deref())
    }
}
