#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod mock;
mod openai;
mod request;
mod response;
mod service;

pub use error::{BoxedError, Error, ErrorKind, Result};
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use mock::MockProvider;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use request::{GenerationRequest, Turn, TurnRole};
pub use response::{GenerationResponse, TokenUsage};
pub use service::GenerationService;

/// Tracing target for generation calls made through [`GenerationService`].
pub const TRACING_TARGET: &str = "kozani_openai::generation";

/// Tracing target for the HTTP client.
pub const TRACING_TARGET_CLIENT: &str = "kozani_openai::client";

/// Backend able to turn an ordered turn sequence into reply text.
///
/// Implementations make exactly one upstream attempt per call.
#[async_trait::async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short provider identifier, echoed to API callers.
    fn provider_name(&self) -> &str;

    /// Model identifier used for completions.
    fn model_name(&self) -> &str;

    /// Generates a completion for the given turns.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;
}
