//! Phone/password login, registering unknown phone numbers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;

use crate::extract::{Json, ValidateJson};
use crate::handler::Result;
use crate::handler::request::Login;
use crate::handler::response::{ErrorResponse, LoginResponse};
use crate::service::{CredentialService, ServiceState};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "kozani_server::handler::authentication";

/// Logs in with phone and password, creating the user on first use.
#[tracing::instrument(skip_all)]
async fn login(
    State(credentials): State<CredentialService>,
    ValidateJson(request): ValidateJson<Login>,
) -> Result<(StatusCode, Json<LoginResponse>)> {
    tracing::debug!(target: TRACING_TARGET, "Login attempt");

    let outcome = credentials
        .login(
            request.normalized_phone(),
            &request.password,
            request.normalized_name(),
        )
        .await?;

    let status = if outcome.is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %outcome.user.id,
        is_new = outcome.is_new,
        "Login succeeded"
    );

    Ok((status, Json(outcome.into())))
}

fn login_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Log in")
        .description(
            "Authenticates with a phone number and password. Unknown phone numbers are \
             registered on the spot and answered with 201.",
        )
        .response::<200, Json<LoginResponse>>()
        .response::<201, Json<LoginResponse>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<500, Json<ErrorResponse>>()
}

/// Returns routes for authentication.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/login", post_with(login, login_docs))
        .with_path_items(|item| item.tag("Authentication"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handler::response::{ErrorResponse, LoginResponse};
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn first_login_registers() -> anyhow::Result<()> {
        let context = create_test_server()?;

        let response = context
            .server
            .post("/login")
            .json(&json!({"phone": " +254700000001 ", "password": "pass", "name": " Amina "}))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body = response.json::<LoginResponse>();
        assert!(body.is_new);
        assert_eq!(body.phone, "+254700000001");
        assert_eq!(body.name.as_deref(), Some("Amina"));
        assert_eq!(context.credentials.user_count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn repeat_login_succeeds() -> anyhow::Result<()> {
        let context = create_test_server()?;
        let payload = json!({"phone": "0712", "password": "pass"});

        let first = context.server.post("/login").json(&payload).await;
        first.assert_status(StatusCode::CREATED);
        let registered = first.json::<LoginResponse>();

        let second = context.server.post("/login").json(&payload).await;
        second.assert_status_ok();
        let body = second.json::<LoginResponse>();
        assert!(!body.is_new);
        assert_eq!(body.user_id, registered.user_id);
        assert_eq!(body.name, None);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() -> anyhow::Result<()> {
        let context = create_test_server()?;
        context
            .server
            .post("/login")
            .json(&json!({"phone": "0712", "password": "pass"}))
            .await
            .assert_status(StatusCode::CREATED);

        let response = context
            .server
            .post("/login")
            .json(&json!({"phone": "0712", "password": "nope"}))
            .await;
        response.assert_status_unauthorized();

        let body = response.json::<ErrorResponse>();
        assert_eq!(body.name, "unauthorized");
        assert_eq!(body.message, "Invalid phone number or password");
        assert_eq!(context.credentials.user_count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_fields_are_bad_requests() -> anyhow::Result<()> {
        let context = create_test_server()?;

        for payload in [
            json!({"password": "pass"}),
            json!({"phone": "0712"}),
            json!({"phone": "   ", "password": "pass"}),
            json!({"phone": "0712", "password": ""}),
        ] {
            let response = context.server.post("/login").json(&payload).await;
            response.assert_status_bad_request();
            assert_eq!(response.json::<ErrorResponse>().name, "bad_request");
        }

        assert_eq!(context.credentials.user_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() -> anyhow::Result<()> {
        let context = create_test_server()?;

        let response = context
            .server
            .post("/login")
            .content_type("application/json")
            .text("{not json")
            .await;
        response.assert_status_bad_request();
        Ok(())
    }
}
