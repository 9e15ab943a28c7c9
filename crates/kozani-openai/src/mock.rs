//! Recording mock provider for tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::{
    Error, ErrorKind, GenerationProvider, GenerationRequest, GenerationResponse, GenerationService,
    Result,
};

#[derive(Debug, Clone)]
enum Behavior {
    Reply(Option<String>),
    Fail(ErrorKind),
}

/// In-memory [`GenerationProvider`] returning a canned outcome.
///
/// Every request it receives is recorded and can be inspected with
/// [`requests`](MockProvider::requests).
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: Behavior,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockProvider {
    /// Model name reported by the mock.
    pub const MODEL: &'static str = "mock-model";

    /// Replies with the given text.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self::from_behavior(Behavior::Reply(Some(reply.into())))
    }

    /// Replies without any content.
    pub fn with_empty_reply() -> Self {
        Self::from_behavior(Behavior::Reply(None))
    }

    /// Fails every call with the given error kind.
    pub fn failing(kind: ErrorKind) -> Self {
        Self::from_behavior(Behavior::Fail(kind))
    }

    fn from_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            delay: None,
            requests: Arc::default(),
        }
    }

    /// Waits for `delay` before producing each outcome.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns a copy of every request received so far.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    /// Returns the number of calls made.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Wraps a clone of this mock in a [`GenerationService`].
    pub fn service(&self) -> GenerationService {
        GenerationService::new(self.clone())
    }
}

#[async_trait::async_trait]
impl GenerationProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        Self::MODEL
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.requests.lock().await.push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Reply(content) => Ok(GenerationResponse::new(Self::MODEL, content.clone())),
            Behavior::Fail(kind) => Err(Error::new(*kind).with_message("mock failure")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Turn;

    #[tokio::test]
    async fn records_requests() -> anyhow::Result<()> {
        let mock = MockProvider::with_reply("Hello.");
        let service = mock.service();

        let response = service
            .generate(&GenerationRequest::new(vec![Turn::user("Hi")]))
            .await?;
        assert_eq!(response.text(), Some("Hello."));
        assert_eq!(mock.call_count().await, 1);
        assert_eq!(mock.requests().await[0].last_user_turn(), Some("Hi"));
        Ok(())
    }

    #[tokio::test]
    async fn failing_mock_errors() {
        let mock = MockProvider::failing(ErrorKind::RateLimited);
        let result = mock.generate(&GenerationRequest::new(Vec::new())).await;
        assert_eq!(result.unwrap_err().kind, ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn delayed_mock_waits() -> anyhow::Result<()> {
        let mock = MockProvider::with_reply("Later.").with_delay(Duration::from_millis(50));

        let started = std::time::Instant::now();
        mock.generate(&GenerationRequest::new(Vec::new())).await?;
        assert!(started.elapsed() >= Duration::from_millis(50));
        Ok(())
    }
}
