//! Persistence seams for credentials and conversation history.
//!
//! Handlers and the reply orchestrator only see the object-safe traits. The
//! Postgres implementations are used in production, the in-memory ones back
//! the HTTP tests.

mod conversation;
mod credential;
#[cfg(any(test, feature = "test-utils"))]
mod memory;

pub use conversation::{ConversationStore, PgConversationStore, StoredTurn};
pub use credential::{CredentialStore, PgCredentialStore, UserRecord};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::{MemoryConversationStore, MemoryCredentialStore};

/// Tracing target for store operations.
const TRACING_TARGET: &str = "kozani_server::service::store";
