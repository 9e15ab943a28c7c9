//! Generation service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::{GenerationProvider, GenerationRequest, GenerationResponse, Result, TRACING_TARGET};

/// Generation service wrapper with observability.
///
/// Adds structured logging around any [`GenerationProvider`]. Cloning is cheap.
#[derive(Clone)]
pub struct GenerationService {
    inner: Arc<dyn GenerationProvider>,
}

impl fmt::Debug for GenerationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationService")
            .field("provider", &self.inner.provider_name())
            .field("model", &self.inner.model_name())
            .finish_non_exhaustive()
    }
}

impl GenerationService {
    /// Creates a new generation service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: GenerationProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Creates a service from an already shared provider.
    pub fn from_provider(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { inner: provider }
    }

    /// Returns the provider identifier.
    pub fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    /// Returns the model identifier.
    pub fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    /// Generates a completion for the given turns.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            provider = self.inner.provider_name(),
            model = self.inner.model_name(),
            turns = request.turns.len(),
            "Requesting completion"
        );

        let result = self.inner.generate(request).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(response) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    model = %response.model,
                    finish_reason = ?response.finish_reason,
                    has_content = response.text().is_some(),
                    elapsed_ms = elapsed.as_millis(),
                    "Completion received"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Completion failed"
                );
            }
        }

        result
    }
}
