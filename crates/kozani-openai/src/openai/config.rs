//! OpenAI client configuration.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, ErrorKind, Result};

/// Default chat-completions endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Default bound on generated tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 400;

/// Default request timeout: 25 seconds.
///
/// Must stay below the server's request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 25;

/// Configuration for the OpenAI chat-completions client.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    #[cfg_attr(
        feature = "config",
        arg(long = "openai-api-key", env = "OPENAI_API_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing, default)]
    pub openai_api_key: String,

    /// Base URL of the chat-completions API
    #[cfg_attr(
        feature = "config",
        arg(long = "openai-base-url", env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)
    )]
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,

    /// Completion model identifier
    #[cfg_attr(
        feature = "config",
        arg(long = "openai-model", env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)
    )]
    #[serde(default = "default_model")]
    pub openai_model: String,

    /// Sampling temperature used when a request does not override it
    #[cfg_attr(
        feature = "config",
        arg(long = "openai-temperature", env = "OPENAI_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)
    )]
    #[serde(default = "default_temperature")]
    pub openai_temperature: f32,

    /// Output length bound used when a request does not override it
    #[cfg_attr(
        feature = "config",
        arg(long = "openai-max-tokens", env = "OPENAI_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)
    )]
    #[serde(default = "default_max_tokens")]
    pub openai_max_tokens: u32,

    /// Request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "openai-timeout-secs", env = "OPENAI_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)
    )]
    #[serde(default = "default_timeout_secs")]
    pub openai_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: default_base_url(),
            openai_model: default_model(),
            openai_temperature: default_temperature(),
            openai_max_tokens: default_max_tokens(),
            openai_timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("openai_api_key", &"[REDACTED]")
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("openai_temperature", &self.openai_temperature)
            .field("openai_max_tokens", &self.openai_max_tokens)
            .field("openai_timeout_secs", &self.openai_timeout_secs)
            .finish()
    }
}

impl OpenAiConfig {
    /// Creates a configuration with the given API key and defaults elsewhere.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Returns the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.openai_timeout_secs)
    }

    /// Returns the full chat-completions endpoint URL.
    pub fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.openai_base_url.trim_end_matches('/')
        )
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.openai_base_url = base_url.into();
        self
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.openai_model = model.into();
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.openai_timeout_secs = timeout_secs;
        self
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.trim().is_empty() {
            return Err(Error::new(ErrorKind::Configuration)
                .with_message("OpenAI API key is missing; set OPENAI_API_KEY"));
        }

        if !self.openai_base_url.starts_with("http://")
            && !self.openai_base_url.starts_with("https://")
        {
            return Err(Error::new(ErrorKind::Configuration)
                .with_message("OpenAI base URL must start with http:// or https://"));
        }

        if self.openai_model.trim().is_empty() {
            return Err(
                Error::new(ErrorKind::Configuration).with_message("OpenAI model cannot be empty")
            );
        }

        if !(0.0..=1.0).contains(&self.openai_temperature) {
            return Err(Error::new(ErrorKind::Configuration)
                .with_message("OpenAI temperature must be between 0.0 and 1.0"));
        }

        if self.openai_max_tokens == 0 {
            return Err(Error::new(ErrorKind::Configuration)
                .with_message("OpenAI max tokens must be greater than zero"));
        }

        if !(1..=300).contains(&self.openai_timeout_secs) {
            return Err(Error::new(ErrorKind::Configuration)
                .with_message("OpenAI timeout must be between 1 and 300 seconds"));
        }

        Ok(())
    }
}
