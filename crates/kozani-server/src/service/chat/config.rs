#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default number of prior turns loaded per request.
pub const DEFAULT_HISTORY_LIMIT: usize = 8;

/// Upper bound for [`ChatConfig::history_limit`].
const MAX_HISTORY_LIMIT: usize = 50;

/// Reply orchestration settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ChatConfig {
    /// Number of prior turns loaded into each prompt.
    #[cfg_attr(
        feature = "config",
        arg(long = "chat-history-limit", env = "CHAT_HISTORY_LIMIT", default_value = "8")
    )]
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl ChatConfig {
    /// Sets the history limit.
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    /// Checks that the history limit is within 1..=50.
    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 || self.history_limit > MAX_HISTORY_LIMIT {
            return Err(Error::config(format!(
                "chat history limit must be between 1 and {MAX_HISTORY_LIMIT}, got {}",
                self.history_limit
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = ChatConfig::default();
        assert_eq!(config.history_limit, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_limits() {
        assert!(ChatConfig::default().with_history_limit(0).validate().is_err());
        assert!(ChatConfig::default().with_history_limit(51).validate().is_err());
        assert!(ChatConfig::default().with_history_limit(50).validate().is_ok());
    }
}
