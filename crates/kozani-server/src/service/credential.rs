//! Phone/password login with registration on first use.

use std::fmt;
use std::sync::Arc;

use crate::handler::{ErrorKind, Result};
use crate::service::security::PasswordHasher;
use crate::service::store::{CredentialStore, UserRecord};

/// Tracing target for credential operations.
const TRACING_TARGET: &str = "kozani_server::service::credential";

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserRecord,
    /// Whether the user was registered by this call.
    pub is_new: bool,
}

/// Login-or-register over a [`CredentialStore`].
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
}

impl CredentialService {
    /// Creates a new service over the given store.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
        }
    }

    /// Logs a user in, registering the phone number if it is unknown.
    ///
    /// `phone` and `name` are expected to be trimmed already. A wrong
    /// password yields an `Unauthorized` error with no detail about whether
    /// the phone is registered, and the stored user is left untouched.
    pub async fn login(
        &self,
        phone: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<LoginOutcome> {
        if let Some(user) = self.store.find_by_phone(phone).await? {
            return self.verify_existing(user, password);
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = match self.store.create(phone, password_hash, name).await {
            Ok(user) => user,
            Err(error) if error.kind() == ErrorKind::Conflict => {
                // Registered by a concurrent request since the lookup.
                tracing::debug!(target: TRACING_TARGET, "Phone registered concurrently");
                let user = self.store.find_by_phone(phone).await?.ok_or_else(|| {
                    ErrorKind::InternalServerError
                        .with_context("user missing after unique violation on phone")
                })?;
                return self.verify_existing(user, password);
            }
            Err(error) => return Err(error),
        };

        tracing::info!(target: TRACING_TARGET, user_id = %user.id, "New user registered");
        Ok(LoginOutcome { user, is_new: true })
    }

    fn verify_existing(&self, user: UserRecord, password: &str) -> Result<LoginOutcome> {
        self.hasher.verify_password(password, &user.password_hash)?;

        tracing::debug!(target: TRACING_TARGET, user_id = %user.id, "Existing user logged in");
        Ok(LoginOutcome {
            user,
            is_new: false,
        })
    }
}

impl fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::service::store::MemoryCredentialStore;

    /// Misses the first lookup, as if another request registered the phone
    /// between the lookup and the insert.
    struct LateRegistration {
        inner: Arc<MemoryCredentialStore>,
        missed: AtomicBool,
    }

    #[async_trait]
    impl CredentialStore for LateRegistration {
        async fn find_by_phone(&self, phone: &str) -> Result<Option<UserRecord>> {
            if !self.missed.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_by_phone(phone).await
        }

        async fn create(
            &self,
            phone: &str,
            password_hash: String,
            name: Option<String>,
        ) -> Result<UserRecord> {
            self.inner.create(phone, password_hash, name).await
        }
    }

    async fn registered_concurrently() -> anyhow::Result<(CredentialService, UserRecord)> {
        let (service, inner) = self::service();
        let existing = service.login("0712", "secret", None).await?.user;

        let store = LateRegistration {
            inner,
            missed: AtomicBool::new(false),
        };
        Ok((CredentialService::new(Arc::new(store)), existing))
    }

    fn service() -> (CredentialService, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        (CredentialService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn registers_then_logs_in() -> anyhow::Result<()> {
        let (service, _) = service();

        let first = service
            .login("0712", "secret", Some("Amina".to_owned()))
            .await?;
        assert!(first.is_new);
        assert_eq!(first.user.name.as_deref(), Some("Amina"));

        let second = service.login("0712", "secret", None).await?;
        assert!(!second.is_new);
        assert_eq!(second.user.id, first.user.id);
        assert_eq!(second.user.name.as_deref(), Some("Amina"));
        Ok(())
    }

    #[tokio::test]
    async fn stores_hash_not_plaintext() -> anyhow::Result<()> {
        let (service, store) = service();
        service.login("0712", "secret", None).await?;

        let stored = store.get("0712").await.ok_or_else(|| anyhow::anyhow!("missing user"))?;
        assert_ne!(stored.password_hash, "secret");
        assert!(stored.password_hash.starts_with("$argon2id$"));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_leaves_user_unchanged() -> anyhow::Result<()> {
        let (service, store) = service();
        service.login("0712", "secret", None).await?;
        let before = store.get("0712").await;

        let error = service
            .login("0712", "guess", Some("Other".to_owned()))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        assert_eq!(store.get("0712").await, before);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_registration_logs_in_existing_user() -> anyhow::Result<()> {
        let (service, existing) = registered_concurrently().await?;

        let outcome = service.login("0712", "secret", None).await?;
        assert!(!outcome.is_new);
        assert_eq!(outcome.user.id, existing.id);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_registration_checks_password() -> anyhow::Result<()> {
        let (service, _) = registered_concurrently().await?;

        let error = service.login("0712", "guess", None).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_is_internal() {
        let store = Arc::new(MemoryCredentialStore::new().with_failures());
        let service = CredentialService::new(store);

        let error = service.login("0712", "secret", None).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }
}
