//! Reply orchestration: prompt assembly, generation and history persistence.

mod config;
mod prompt;

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use kozani_openai::{GenerationRequest, GenerationService, Turn, TurnRole};
use kozani_postgres::types::MessageRole;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

pub use self::config::{ChatConfig, DEFAULT_HISTORY_LIMIT};
pub use self::prompt::{GROUNDING_HEADER, SYSTEM_PROMPT, grounding_block, system_prompt};
use crate::Result;
use crate::handler::request::ChatRequest;
use crate::handler::response::{
    BACKEND_ERROR_FLAG, ChatMeta, ChatResponse, EMPTY_QUERY_FLAG, Safety,
};
use crate::service::store::{ConversationStore, StoredTurn};

/// Tracing target for reply orchestration.
const TRACING_TARGET: &str = "kozani_server::service::chat";

/// Reply for a missing or blank utterance.
pub const EMPTY_QUERY_REPLY: &str = "I'm sorry, I didn't catch a question there. \
Could you tell me a little about what is on your mind?";

/// Reply when history loading or generation fails.
pub const APOLOGY_REPLY: &str = "I'm sorry, I'm having trouble responding right now. \
Please try again in a moment. If you feel unwell or unsafe, please contact a health \
worker or go to the nearest clinic straight away.";

/// Reply when generation succeeds without usable text.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't put together a helpful answer \
just now. Could you say a little more about how you are feeling?";

impl From<StoredTurn> for Turn {
    fn from(turn: StoredTurn) -> Self {
        let role = match turn.role {
            MessageRole::User => TurnRole::User,
            MessageRole::Assistant => TurnRole::Assistant,
        };
        Turn::new(role, turn.content)
    }
}

/// Status and body produced for one chat request.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub status: StatusCode,
    pub response: ChatResponse,
}

/// Builds prompts from history and grounding, calls the generation service
/// and records both sides of the exchange.
///
/// History writes run on a [`TaskTracker`] so the reply never waits on them.
#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ConversationStore>,
    generation: GenerationService,
    config: ChatConfig,
    tracker: TaskTracker,
}

impl ChatService {
    /// Creates a new orchestrator.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        generation: GenerationService,
        config: ChatConfig,
    ) -> Self {
        Self {
            store,
            generation,
            config,
            tracker: TaskTracker::new(),
        }
    }

    /// Returns the tracker owning in-flight history writes.
    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// Waits until every spawned history write has finished.
    pub async fn wait_for_persistence(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Produces a reply for the request.
    ///
    /// Never fails: errors are logged and turned into a canned apology with
    /// the matching safety flag and status.
    pub async fn respond(&self, request: &ChatRequest) -> ChatOutcome {
        let Some(query) = request.utterance() else {
            tracing::debug!(target: TRACING_TARGET, "Rejecting empty query");
            return ChatOutcome {
                status: StatusCode::BAD_REQUEST,
                response: self.canned(request, EMPTY_QUERY_REPLY, EMPTY_QUERY_FLAG, false),
            };
        };

        let grounding = grounding_block(&request.snippets);
        let used_grounding = !grounding.is_empty();

        match self.generate(request.user_id, query, &grounding).await {
            Ok(reply) => {
                if let Some(user_id) = request.user_id {
                    self.persist(user_id, query.to_owned(), reply.clone());
                }

                ChatOutcome {
                    status: StatusCode::OK,
                    response: ChatResponse {
                        reply,
                        safety: Safety::ok(),
                        meta: self.meta(request, used_grounding),
                    },
                }
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %err,
                    kind = %err.kind(),
                    "Chat reply failed"
                );

                ChatOutcome {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    response: self.canned(
                        request,
                        APOLOGY_REPLY,
                        BACKEND_ERROR_FLAG,
                        used_grounding,
                    ),
                }
            }
        }
    }

    async fn generate(&self, user_id: Option<Uuid>, query: &str, grounding: &str) -> Result<String> {
        let limit = self.config.history_limit;
        let mut turns = Vec::with_capacity(limit + 2);
        turns.push(Turn::system(system_prompt(grounding)));

        if let Some(user_id) = user_id {
            let history = self.store.recent(user_id, limit).await?;
            tracing::debug!(
                target: TRACING_TARGET,
                user_id = %user_id,
                history_len = history.len(),
                "Loaded conversation history"
            );
            turns.extend(history.into_iter().map(Turn::from));
        }

        turns.push(Turn::user(query));

        let response = self
            .generation
            .generate(&GenerationRequest::new(turns))
            .await?;

        match response.text() {
            Some(text) => Ok(text.to_owned()),
            None => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    model = %response.model,
                    "Generation returned no content, using fallback reply"
                );
                Ok(FALLBACK_REPLY.to_owned())
            }
        }
    }

    fn persist(&self, user_id: Uuid, query: String, reply: String) {
        let store = self.store.clone();

        self.tracker.spawn(async move {
            for (role, content) in [(MessageRole::User, query), (MessageRole::Assistant, reply)] {
                if let Err(err) = store.append(user_id, role, &content).await {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        user_id = %user_id,
                        role = %role,
                        error = %err,
                        "Failed to persist chat message"
                    );
                }
            }
        });
    }

    fn meta(&self, request: &ChatRequest, used_grounding: bool) -> ChatMeta {
        ChatMeta {
            model: self.generation.model_name().to_owned(),
            provider: self.generation.provider_name().to_owned(),
            used_grounding,
            language: request.language.clone(),
            client: request.client.clone(),
        }
    }

    fn canned(
        &self,
        request: &ChatRequest,
        reply: &str,
        flag: &str,
        used_grounding: bool,
    ) -> ChatResponse {
        ChatResponse {
            reply: reply.to_owned(),
            safety: Safety::flagged(flag),
            meta: self.meta(request, used_grounding),
        }
    }
}

impl fmt::Debug for ChatService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatService")
            .field("generation", &self.generation)
            .field("config", &self.config)
            .field("pending_writes", &self.tracker.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use kozani_openai::{ErrorKind, MockProvider};

    use super::*;
    use crate::service::store::MemoryConversationStore;

    fn chat(store: &Arc<MemoryConversationStore>, mock: &MockProvider) -> ChatService {
        ChatService::new(store.clone(), mock.service(), ChatConfig::default())
    }

    #[tokio::test]
    async fn empty_query_touches_nothing() -> anyhow::Result<()> {
        let store = Arc::new(MemoryConversationStore::new());
        let mock = MockProvider::with_reply("unused");
        let service = chat(&store, &mock);

        let request = ChatRequest::new("   ").with_user(Uuid::new_v4());
        let outcome = service.respond(&request).await;
        service.wait_for_persistence().await;

        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
        assert_eq!(outcome.response.reply, EMPTY_QUERY_REPLY);
        assert_eq!(outcome.response.safety, Safety::flagged(EMPTY_QUERY_FLAG));
        assert_eq!(store.read_count(), 0);
        assert_eq!(store.append_count(), 0);
        assert_eq!(mock.call_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn history_is_ascending_and_capped() -> anyhow::Result<()> {
        let store = Arc::new(MemoryConversationStore::new());
        let user_id = Uuid::new_v4();
        store
            .seed(
                user_id,
                (0..12).map(|i| {
                    if i % 2 == 0 {
                        StoredTurn::user(format!("turn {i}"))
                    } else {
                        StoredTurn::assistant(format!("turn {i}"))
                    }
                }),
            )
            .await;
        let mock = MockProvider::with_reply("You are doing well.");
        let service = chat(&store, &mock);

        let outcome = service
            .respond(&ChatRequest::new("How long should I rest?").with_user(user_id))
            .await;
        assert_eq!(outcome.status, StatusCode::OK);

        let requests = mock.requests().await;
        let turns = &requests[0].turns;
        assert_eq!(turns.len(), 1 + DEFAULT_HISTORY_LIMIT + 1);
        assert_eq!(turns[0].role, TurnRole::System);
        assert_eq!(turns[1], Turn::user("turn 4"));
        assert_eq!(turns[2], Turn::assistant("turn 5"));
        assert_eq!(turns[8], Turn::assistant("turn 11"));
        assert_eq!(turns[9], Turn::user("How long should I rest?"));
        Ok(())
    }

    #[tokio::test]
    async fn exchange_is_persisted_in_order() -> anyhow::Result<()> {
        let store = Arc::new(MemoryConversationStore::new());
        let user_id = Uuid::new_v4();
        let mock = MockProvider::with_reply("Rest when you can.");
        let service = chat(&store, &mock);

        let outcome = service
            .respond(&ChatRequest::new("I'm exhausted").with_user(user_id))
            .await;
        service.wait_for_persistence().await;

        assert_eq!(outcome.response.reply, "Rest when you can.");
        assert_eq!(
            store.history(user_id).await,
            [
                StoredTurn::user("I'm exhausted"),
                StoredTurn::assistant("Rest when you can.")
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn anonymous_requests_skip_the_store() -> anyhow::Result<()> {
        let store = Arc::new(MemoryConversationStore::new());
        let mock = MockProvider::with_reply("Hello.");
        let service = chat(&store, &mock);

        let outcome = service.respond(&ChatRequest::new("hi")).await;
        service.wait_for_persistence().await;

        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(store.read_count(), 0);
        assert_eq!(store.append_count(), 0);
        assert_eq!(mock.requests().await[0].turns.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn persistence_failure_still_replies() -> anyhow::Result<()> {
        let store = Arc::new(MemoryConversationStore::new().with_failing_appends());
        let mock = MockProvider::with_reply("I am here for you.");
        let service = chat(&store, &mock);

        let outcome = service
            .respond(&ChatRequest::new("hello").with_user(Uuid::new_v4()))
            .await;
        service.wait_for_persistence().await;

        assert_eq!(outcome.status, StatusCode::OK);
        assert!(outcome.response.safety.ok);
        assert_eq!(store.append_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn history_failure_is_backend_error() -> anyhow::Result<()> {
        let store = Arc::new(MemoryConversationStore::new().with_failing_reads());
        let mock = MockProvider::with_reply("unused");
        let service = chat(&store, &mock);

        let outcome = service
            .respond(&ChatRequest::new("hello").with_user(Uuid::new_v4()))
            .await;

        assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outcome.response.reply, APOLOGY_REPLY);
        assert_eq!(outcome.response.safety, Safety::flagged(BACKEND_ERROR_FLAG));
        assert_eq!(mock.call_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn generation_failure_is_backend_error() -> anyhow::Result<()> {
        let store = Arc::new(MemoryConversationStore::new());
        let mock = MockProvider::failing(ErrorKind::ServiceUnavailable);
        let service = chat(&store, &mock);

        let outcome = service
            .respond(&ChatRequest::new("hello").with_user(Uuid::new_v4()))
            .await;
        service.wait_for_persistence().await;

        assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outcome.response.safety.flags, [BACKEND_ERROR_FLAG]);
        assert_eq!(store.append_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn empty_generation_uses_fallback() -> anyhow::Result<()> {
        let store = Arc::new(MemoryConversationStore::new());
        let mock = MockProvider::with_empty_reply();
        let service = chat(&store, &mock);

        let outcome = service.respond(&ChatRequest::new("hello")).await;

        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(outcome.response.reply, FALLBACK_REPLY);
        assert!(outcome.response.safety.ok);
        Ok(())
    }

    #[tokio::test]
    async fn blank_snippets_do_not_count_as_grounding() -> anyhow::Result<()> {
        let store = Arc::new(MemoryConversationStore::new());
        let mock = MockProvider::with_reply("Okay.");
        let service = chat(&store, &mock);

        let request = ChatRequest::new("Is this normal?")
            .with_snippet("")
            .with_snippet("   ");
        let outcome = service.respond(&request).await;

        assert!(!outcome.response.meta.used_grounding);
        assert_eq!(mock.requests().await[0].turns[0].content, SYSTEM_PROMPT);
        Ok(())
    }

    #[tokio::test]
    async fn grounding_reaches_system_prompt() -> anyhow::Result<()> {
        let store = Arc::new(MemoryConversationStore::new());
        let mock = MockProvider::with_reply("Okay.");
        let service = chat(&store, &mock);

        let request = ChatRequest::new("Is this normal?")
            .with_snippet("Night sweats are common after birth.")
            .with_snippet("They usually settle within weeks.");
        let outcome = service.respond(&request).await;

        assert!(outcome.response.meta.used_grounding);
        assert_eq!(outcome.response.meta.model, MockProvider::MODEL);
        assert_eq!(outcome.response.meta.provider, "mock");

        let system = &mock.requests().await[0].turns[0].content;
        assert!(system.starts_with(SYSTEM_PROMPT));
        assert!(system.ends_with(
            "Night sweats are common after birth.\n\nThey usually settle within weeks."
        ));
        Ok(())
    }
}
