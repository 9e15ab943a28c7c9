//! Service error to HTTP error conversion.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::ErrorKind as ServiceErrorKind;

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "kozani_server::handler::service";

impl From<crate::Error> for HttpError<'static> {
    fn from(error: crate::Error) -> Self {
        match error.kind() {
            ServiceErrorKind::Store => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    source = ?std::error::Error::source(&error),
                    "Store operation failed"
                );
            }
            ServiceErrorKind::Generation => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Generation request failed"
                );
            }
            ServiceErrorKind::Config | ServiceErrorKind::Internal => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = %error.kind(),
                    "Service operation failed"
                );
            }
        }

        ErrorKind::InternalServerError.into_error()
    }
}
