//! Authentication response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::LoginOutcome;

/// Response returned after a successful login or registration.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoginResponse {
    /// ID of the authenticated user.
    pub user_id: Uuid,
    /// Display name given at registration.
    pub name: Option<String>,
    /// Phone number the user registered with.
    pub phone: String,
    /// Whether this call registered the user.
    pub is_new: bool,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            user_id: outcome.user.id,
            name: outcome.user.name,
            phone: outcome.user.phone,
            is_new: outcome.is_new,
        }
    }
}
