//! Database error to HTTP error conversion.
//!
//! Known constraint violations become client errors. Everything else is
//! logged and reported as an internal server error.

use kozani_postgres::PgError;
use kozani_postgres::types::{ConstraintViolation, MessageConstraints, UserConstraints};

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversions.
const TRACING_TARGET: &str = "kozani_server::postgres_constraints";

impl From<UserConstraints> for Error<'static> {
    fn from(c: UserConstraints) -> Self {
        let error = match c {
            UserConstraints::PhoneNotEmpty => {
                ErrorKind::BadRequest.with_message("Phone number cannot be empty")
            }
            UserConstraints::PhoneLengthMax => {
                ErrorKind::BadRequest.with_message("Phone number is too long")
            }
            UserConstraints::PasswordHashNotEmpty => ErrorKind::InternalServerError.into_error(),
            UserConstraints::NameLengthMax => {
                ErrorKind::BadRequest.with_message("Name cannot exceed 120 characters")
            }
            UserConstraints::PhoneUnique => {
                ErrorKind::Conflict.with_message("Phone number is already registered")
            }
        };

        error.with_resource("user")
    }
}

impl From<MessageConstraints> for Error<'static> {
    fn from(c: MessageConstraints) -> Self {
        let error = match c {
            MessageConstraints::UserExists => {
                ErrorKind::BadRequest.with_message("Referenced user does not exist")
            }
        };

        error.with_resource("message")
    }
}

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        match constraint {
            ConstraintViolation::User(c) => c.into(),
            ConstraintViolation::Message(c) => c.into(),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if let Some(constraint) = error.constraint_violation() {
            tracing::warn!(
                target: TRACING_TARGET,
                constraint = %constraint,
                category = ?constraint.categorize(),
                error = %error,
                "query error (constraint violation)"
            );
            return constraint.into();
        }

        match &error {
            PgError::Config(_) => {
                tracing::error!(target: TRACING_TARGET, error = %error, "database configuration error");
            }
            PgError::Timeout(timeout) => {
                tracing::error!(target: TRACING_TARGET, timeout = ?timeout, "database timeout");
            }
            PgError::Connection(_) => {
                tracing::error!(target: TRACING_TARGET, error = %error, "database connection error");
            }
            PgError::Migration(_) => {
                tracing::error!(target: TRACING_TARGET, error = %error, "database migration error");
            }
            PgError::Query(_) => {
                tracing::error!(target: TRACING_TARGET, error = %error, "query error");
            }
            PgError::Unexpected(_) => {
                tracing::error!(target: TRACING_TARGET, error = %error, "unexpected database error");
            }
        }

        ErrorKind::InternalServerError.into_error()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn uniqueness_maps_to_conflict() {
        let error: Error = UserConstraints::PhoneUnique.into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("user"));
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let error: Error = ConstraintViolation::User(UserConstraints::PhoneLengthMax).into();
        assert_eq!(error.kind().status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn non_constraint_errors_are_internal() {
        let error: Error = PgError::Unexpected(Cow::Borrowed("boom")).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }
}
