//! Liveness and database connectivity probes.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use kozani_postgres::query::MonitorRepository;
use kozani_postgres::{PgClient, PgResult};

use crate::extract::Json;
use crate::handler::response::{DatabasePing, HealthStatus};
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "kozani_server::handler::monitors";

/// Reports that the process is serving requests.
#[tracing::instrument(skip_all)]
async fn health_status() -> (StatusCode, Json<HealthStatus>) {
    (StatusCode::OK, Json(HealthStatus::default()))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Health check")
        .description("Returns a static status while the process is alive. Touches no dependency.")
        .response::<200, Json<HealthStatus>>()
}

async fn database_now(pg_client: &PgClient) -> PgResult<Timestamp> {
    let mut conn = pg_client.get_connection().await?;
    conn.database_now().await
}

/// Runs `SELECT now()` against the database.
#[tracing::instrument(skip_all)]
async fn database_ping(State(pg_client): State<PgClient>) -> (StatusCode, Json<DatabasePing>) {
    match database_now(&pg_client).await {
        Ok(time) => (StatusCode::OK, Json(DatabasePing::reachable(time))),
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET,
                error = %err,
                "Database ping failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DatabasePing::unreachable()),
            )
        }
    }
}

fn database_ping_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Database ping")
        .description("Round-trips to the database and returns its current time.")
        .response::<200, Json<DatabasePing>>()
        .response::<500, Json<DatabasePing>>()
}

/// Returns routes for service monitoring.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/api/health", get_with(health_status, health_status_docs))
        .api_route("/db-ping", get_with(database_ping, database_ping_docs))
        .with_path_items(|item| item.tag("Monitors"))
}

#[cfg(test)]
mod tests {
    use crate::handler::response::{DatabasePing, HealthStatus};
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn health_reports_ok() -> anyhow::Result<()> {
        let context = create_test_server()?;

        let response = context.server.get("/api/health").await;
        response.assert_status_ok();

        let body = response.json::<HealthStatus>();
        assert_eq!(body.status, "ok");
        assert_eq!(body.service, "kozani-server");
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_database_fails_ping() -> anyhow::Result<()> {
        let context = create_test_server()?;

        let response = context.server.get("/db-ping").await;
        response.assert_status_internal_server_error();

        let body = response.json::<DatabasePing>();
        assert!(!body.ok);
        assert!(body.time.is_none());
        assert_eq!(response.text(), r#"{"ok":false}"#);
        Ok(())
    }
}
