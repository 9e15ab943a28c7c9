//! Password hashing and verification using Argon2id.
//!
//! Errors are returned as HTTP handler errors so that login handlers can
//! propagate them directly.

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use rand::rngs::OsRng;

use crate::handler::{ErrorKind, Result};

/// Tracing target for password hashing.
const TRACING_TARGET: &str = "kozani_server::service::password_hasher";

/// Argon2id password hasher with a random salt per hash.
///
/// Plaintext passwords are never logged.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a new [`PasswordHasher`] with the default Argon2id parameters.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hashes a password, returning a PHC string suitable for storage.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InternalServerError`] if salt generation or
    /// hashing fails.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::try_from_rng(&mut OsRng).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "Failed to generate password salt"
            );

            ErrorKind::InternalServerError
                .with_context("Salt generation error")
                .with_resource("authentication")
        })?;

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "Password hashing failed"
                );

                ErrorKind::InternalServerError
                    .with_context("Hash generation error")
                    .with_resource("authentication")
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Unauthorized`] when the password does not match.
    /// - [`ErrorKind::InternalServerError`] when the stored hash is malformed.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<()> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "Stored password hash has an invalid format"
            );

            ErrorKind::InternalServerError
                .with_context("Hash format error")
                .with_resource("authentication")
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(()),
            Err(ArgonError::Password) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    "Password verification failed"
                );

                Err(ErrorKind::Unauthorized
                    .with_context("Invalid credentials")
                    .with_resource("authentication"))
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "Password verification error"
                );

                Err(ErrorKind::InternalServerError
                    .with_context("Verification error")
                    .with_resource("authentication"))
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
