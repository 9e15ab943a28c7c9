//! Reqwest-based chat-completions client.

use std::sync::Arc;

use reqwest::Client;

use super::OpenAiConfig;
use super::completion::{CompletionBody, CompletionMessage, CompletionReply};
use crate::{
    Error, GenerationProvider, GenerationRequest, GenerationResponse, GenerationService, Result,
    TRACING_TARGET_CLIENT,
};

/// Provider name reported for this client.
const PROVIDER_NAME: &str = "openai";

struct OpenAiClientInner {
    http: Client,
    config: OpenAiConfig,
}

/// Chat-completions client for OpenAI-compatible APIs.
///
/// Each [`generate`](GenerationProvider::generate) call makes exactly one
/// HTTP request; there are no retries.
#[derive(Clone)]
pub struct OpenAiClient {
    inner: Arc<OpenAiClientInner>,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Creates a new client, validating the configuration first.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("kozani/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            model = %config.openai_model,
            base_url = %config.openai_base_url,
            timeout_ms = config.timeout().as_millis(),
            "OpenAI client created"
        );

        let inner = OpenAiClientInner { http, config };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.inner.config
    }

    /// Converts this client into a [`GenerationService`].
    pub fn into_service(self) -> GenerationService {
        GenerationService::new(self)
    }

    fn body<'a>(&'a self, request: &'a GenerationRequest) -> CompletionBody<'a> {
        let config = &self.inner.config;
        CompletionBody {
            model: &config.openai_model,
            messages: request.turns.iter().map(CompletionMessage::from).collect(),
            temperature: request.temperature.unwrap_or(config.openai_temperature),
            max_tokens: request.max_tokens.unwrap_or(config.openai_max_tokens),
        }
    }
}

#[async_trait::async_trait]
impl GenerationProvider for OpenAiClient {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model_name(&self) -> &str {
        &self.inner.config.openai_model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let config = &self.inner.config;
        let url = config.completions_url();

        let response = self
            .inner
            .http
            .post(&url)
            .bearer_auth(&config.openai_api_key)
            .json(&self.body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Body may carry provider diagnostics; never forwarded to callers.
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                status = status.as_u16(),
                detail = %detail.chars().take(512).collect::<String>(),
                "Completion request rejected"
            );
            return Err(Error::from_status(status.as_u16()));
        }

        let reply: CompletionReply = response.json().await?;
        Ok(reply.into_response(&config.openai_model))
    }
}
