//! Chat endpoint relaying a user utterance to the generation service.
//!
//! The body is a [`ChatResponse`] for every outcome the orchestrator
//! produces, including the empty-query `400` and the backend-error `500`.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;

use crate::extract::Json;
use crate::handler::request::ChatRequest;
use crate::handler::response::ChatResponse;
use crate::service::{ChatService, ServiceState};

/// Tracing target for chat operations.
const TRACING_TARGET: &str = "kozani_server::handler::chat";

/// Generates a reply for one user utterance.
#[tracing::instrument(
    skip_all,
    fields(
        user_id = ?request.user_id,
        client = %request.client,
        language = %request.language,
    )
)]
async fn kozani_chat(
    State(chat): State<ChatService>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let outcome = chat.respond(&request).await;

    tracing::info!(
        target: TRACING_TARGET,
        status = outcome.status.as_u16(),
        ok = outcome.response.safety.ok,
        used_grounding = outcome.response.meta.used_grounding,
        "Chat reply sent"
    );

    (outcome.status, Json(outcome.response))
}

fn kozani_chat_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Chat")
        .description(
            "Builds a prompt from the system instructions, optional grounding snippets and \
             the user's recent history, then returns the generated reply. Failures are \
             answered with an apology and machine-readable safety flags.",
        )
        .response::<200, Json<ChatResponse>>()
        .response::<400, Json<ChatResponse>>()
        .response::<500, Json<ChatResponse>>()
}

/// Returns routes for chat.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/api/kozani-chat", post_with(kozani_chat, kozani_chat_docs))
        .with_path_items(|item| item.tag("Chat"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use kozani_openai::{ErrorKind, MockProvider, TurnRole};
    use serde_json::json;
    use uuid::Uuid;

    use crate::handler::response::{
        BACKEND_ERROR_FLAG, ChatResponse, EMPTY_QUERY_FLAG, ErrorResponse,
    };
    use crate::handler::routes;
    use crate::handler::test::{create_test_server, create_test_server_with};
    use crate::middleware::{OpenApiConfig, RecoveryConfig, RouterRecoveryExt};
    use crate::service::store::{MemoryConversationStore, StoredTurn};
    use crate::service::{APOLOGY_REPLY, EMPTY_QUERY_REPLY, FALLBACK_REPLY};

    #[tokio::test]
    async fn empty_query_is_rejected_without_io() -> anyhow::Result<()> {
        let context = create_test_server()?;

        for payload in [
            json!({}),
            json!({"query": ""}),
            json!({"query": "  \n ", "user_id": Uuid::new_v4()}),
        ] {
            let response = context.server.post("/api/kozani-chat").json(&payload).await;
            response.assert_status_bad_request();

            let body = response.json::<ChatResponse>();
            assert_eq!(body.reply, EMPTY_QUERY_REPLY);
            assert!(!body.safety.ok);
            assert_eq!(body.safety.flags, [EMPTY_QUERY_FLAG]);
        }

        context.state.chat.wait_for_persistence().await;
        assert_eq!(context.conversations.read_count(), 0);
        assert_eq!(context.conversations.append_count(), 0);
        assert_eq!(context.mock.call_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn bleeding_question_gets_escalation_prompt() -> anyhow::Result<()> {
        let context = create_test_server_with(
            MemoryConversationStore::new(),
            MockProvider::with_reply(
                "I'm so sorry you're going through this. Heavy bleeding needs urgent \
                 in-person care, so please go to the nearest clinic or hospital now.",
            ),
        )?;

        let response = context
            .server
            .post("/api/kozani-chat")
            .json(&json!({"query": "I'm scared, I've been bleeding a lot", "user_id": null}))
            .await;
        response.assert_status_ok();

        let body = response.json::<ChatResponse>();
        assert!(body.safety.ok);
        assert!(body.safety.flags.is_empty());
        assert!(body.reply.contains("urgent"));
        assert_eq!(body.meta.language, "en");
        assert_eq!(body.meta.client, "web");
        assert!(!body.meta.used_grounding);

        let requests = context.mock.requests().await;
        let turns = &requests[0].turns;
        assert_eq!(turns[0].role, TurnRole::System);
        assert!(turns[0].content.contains("heavy bleeding"));
        assert!(turns[0].content.contains("urgent in-person care"));
        assert_eq!(turns[1].content, "I'm scared, I've been bleeding a lot");
        Ok(())
    }

    #[tokio::test]
    async fn history_is_loaded_and_extended() -> anyhow::Result<()> {
        let conversations = MemoryConversationStore::new();
        let user_id = Uuid::new_v4();
        conversations
            .seed(
                user_id,
                (0..10).map(|i| StoredTurn::user(format!("earlier {i}"))),
            )
            .await;
        let context =
            create_test_server_with(conversations, MockProvider::with_reply("Take it slowly."))?;

        let response = context
            .server
            .post("/api/kozani-chat")
            .json(&json!({
                "query": "Is it okay to walk?",
                "user_id": user_id,
                "language": "sw",
                "client": "android",
            }))
            .await;
        response.assert_status_ok();

        let body = response.json::<ChatResponse>();
        assert_eq!(body.meta.language, "sw");
        assert_eq!(body.meta.client, "android");
        assert_eq!(body.meta.model, MockProvider::MODEL);

        let turns = context.mock.requests().await[0].turns.clone();
        assert_eq!(turns.len(), 10);
        assert_eq!(turns[1].content, "earlier 2");
        assert_eq!(turns[9].content, "Is it okay to walk?");

        context.state.chat.wait_for_persistence().await;
        let history = context.conversations.history(user_id).await;
        assert_eq!(history.len(), 12);
        assert_eq!(history[10], StoredTurn::user("Is it okay to walk?"));
        assert_eq!(history[11], StoredTurn::assistant("Take it slowly."));
        Ok(())
    }

    #[tokio::test]
    async fn persistence_failure_still_returns_reply() -> anyhow::Result<()> {
        let context = create_test_server_with(
            MemoryConversationStore::new().with_failing_appends(),
            MockProvider::with_reply("You are not alone."),
        )?;

        let response = context
            .server
            .post("/api/kozani-chat")
            .json(&json!({"query": "I feel low", "user_id": Uuid::new_v4()}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<ChatResponse>().reply, "You are not alone.");

        context.state.chat.wait_for_persistence().await;
        assert_eq!(context.conversations.append_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn generation_failure_is_backend_error() -> anyhow::Result<()> {
        let context = create_test_server_with(
            MemoryConversationStore::new(),
            MockProvider::failing(ErrorKind::RateLimited),
        )?;

        let response = context
            .server
            .post("/api/kozani-chat")
            .json(&json!({"query": "hello"}))
            .await;
        response.assert_status_internal_server_error();

        let body = response.json::<ChatResponse>();
        assert_eq!(body.reply, APOLOGY_REPLY);
        assert!(!body.safety.ok);
        assert_eq!(body.safety.flags, [BACKEND_ERROR_FLAG]);
        assert!(!response.text().contains("rate"));
        Ok(())
    }

    #[tokio::test]
    async fn slow_generation_timeout_is_backend_error() -> anyhow::Result<()> {
        let mock = MockProvider::failing(ErrorKind::Timeout).with_delay(Duration::from_secs(1));
        let context = create_test_server_with(MemoryConversationStore::new(), mock)?;

        let app = routes(OpenApiConfig::default())
            .with_state(context.state.clone())
            .with_recovery(&RecoveryConfig::with_timeout_secs(3));
        let server = TestServer::new(app)?;

        let response = server
            .post("/api/kozani-chat")
            .json(&json!({"query": "hello"}))
            .await;
        response.assert_status_internal_server_error();

        let body = response.json::<ChatResponse>();
        assert_eq!(body.reply, APOLOGY_REPLY);
        assert_eq!(body.safety.flags, [BACKEND_ERROR_FLAG]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_generation_returns_fallback() -> anyhow::Result<()> {
        let context =
            create_test_server_with(MemoryConversationStore::new(), MockProvider::with_empty_reply())?;

        let response = context
            .server
            .post("/api/kozani-chat")
            .json(&json!({"query": "hello", "snippets": ["Babies feed often."]}))
            .await;
        response.assert_status_ok();

        let body = response.json::<ChatResponse>();
        assert_eq!(body.reply, FALLBACK_REPLY);
        assert!(body.meta.used_grounding);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_uses_error_envelope() -> anyhow::Result<()> {
        let context = create_test_server()?;

        let response = context
            .server
            .post("/api/kozani-chat")
            .content_type("application/json")
            .text("[1, 2")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ErrorResponse>().name, "bad_request");
        Ok(())
    }
}
