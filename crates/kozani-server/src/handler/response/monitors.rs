//! Monitor response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Process liveness response.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthStatus {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Service identifier.
    pub service: String,
    /// Time the response was produced.
    pub time: Timestamp,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "ok".to_owned(),
            service: "kozani-server".to_owned(),
            time: Timestamp::now(),
        }
    }
}

/// Database connectivity response.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatabasePing {
    /// Whether the database answered.
    pub ok: bool,
    /// Database `now()`, present only when `ok` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
}

impl DatabasePing {
    /// Successful ping carrying the database time.
    pub fn reachable(time: Timestamp) -> Self {
        Self {
            ok: true,
            time: Some(time),
        }
    }

    /// Failed ping.
    pub fn unreachable() -> Self {
        Self {
            ok: false,
            time: None,
        }
    }
}
