//! Error types for generation calls.

use thiserror::Error;

/// Boxed dynamic error that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with the generation [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of errors that can occur while generating a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was rejected as malformed, e.g. a context window overflow.
    InvalidInput,
    /// The provider rejected the API key.
    Authentication,
    /// Quota or rate limit exceeded.
    RateLimited,
    /// The provider returned a server error.
    ServiceUnavailable,
    /// Connection to the provider failed.
    NetworkError,
    /// The call exceeded the client timeout.
    Timeout,
    /// The response body could not be decoded.
    Serialization,
    /// The client is misconfigured.
    Configuration,
    /// Any other provider failure.
    ExternalError,
}

/// A structured error for generation operations.
#[derive(Debug, Error)]
#[error("{kind:?}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Maps an upstream HTTP status code to an error.
    pub fn from_status(status: u16) -> Self {
        let kind = match status {
            400 | 404 | 413 | 422 => ErrorKind::InvalidInput,
            401 | 403 => ErrorKind::Authentication,
            429 => ErrorKind::RateLimited,
            500..=599 => ErrorKind::ServiceUnavailable,
            _ => ErrorKind::ExternalError,
        };

        Self::new(kind).with_message(format!("provider responded with status {status}"))
    }

    /// Returns true if retrying later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::RateLimited
                | ErrorKind::ServiceUnavailable
                | ErrorKind::NetworkError
                | ErrorKind::Timeout
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_decode() {
            ErrorKind::Serialization
        } else if err.is_connect() || err.is_request() {
            ErrorKind::NetworkError
        } else if err.is_builder() {
            ErrorKind::Configuration
        } else {
            ErrorKind::ExternalError
        };

        Self::new(kind).with_message(err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Serialization)
            .with_message(err.to_string())
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes() {
        assert_eq!(Error::from_status(401).kind, ErrorKind::Authentication);
        assert_eq!(Error::from_status(429).kind, ErrorKind::RateLimited);
        assert_eq!(Error::from_status(503).kind, ErrorKind::ServiceUnavailable);
        assert_eq!(Error::from_status(400).kind, ErrorKind::InvalidInput);
        assert_eq!(Error::from_status(302).kind, ErrorKind::ExternalError);
    }

    #[test]
    fn display_includes_message() {
        let error = Error::new(ErrorKind::Timeout).with_message("60s elapsed");
        assert_eq!(error.to_string(), "Timeout: 60s elapsed");
        assert!(error.is_transient());
        assert!(!Error::new(ErrorKind::Authentication).is_transient());
    }
}
