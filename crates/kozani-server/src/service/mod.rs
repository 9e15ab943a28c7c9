//! Application state and dependency injection.

mod chat;
mod config;
mod credential;
pub mod security;
pub mod store;

use std::sync::Arc;

use kozani_openai::GenerationService;
use kozani_postgres::PgClient;

pub use crate::service::chat::{
    APOLOGY_REPLY, ChatConfig, ChatOutcome, ChatService, DEFAULT_HISTORY_LIMIT, EMPTY_QUERY_REPLY,
    FALLBACK_REPLY, GROUNDING_HEADER, SYSTEM_PROMPT,
};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::credential::{CredentialService, LoginOutcome};
use crate::service::store::{
    ConversationStore, CredentialStore, PgConversationStore, PgCredentialStore,
};
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // External services:
    pub postgres: PgClient,
    pub generation: GenerationService,

    // Internal services:
    pub credentials: CredentialService,
    pub chat: ChatService,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to Postgres, applies migrations and creates the generation
    /// client.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let postgres = config.connect_postgres().await?;
        let generation = config.connect_generation()?;

        Ok(Self::from_parts(
            postgres.clone(),
            Arc::new(PgCredentialStore::new(postgres.clone())),
            Arc::new(PgConversationStore::new(postgres)),
            generation,
            config.chat_config,
        ))
    }

    /// Assembles state from already constructed parts.
    pub fn from_parts(
        postgres: PgClient,
        credential_store: Arc<dyn CredentialStore>,
        conversation_store: Arc<dyn ConversationStore>,
        generation: GenerationService,
        chat_config: ChatConfig,
    ) -> Self {
        Self {
            chat: ChatService::new(conversation_store, generation.clone(), chat_config),
            credentials: CredentialService::new(credential_store),
            postgres,
            generation,
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(postgres: PgClient);
impl_di!(generation: GenerationService);

// Internal services:
impl_di!(credentials: CredentialService);
impl_di!(chat: ChatService);
