//! HTTP server startup and lifecycle management.

mod error;
mod http_server;
mod lifecycle;
mod shutdown;

use axum::Router;
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;
pub use crate::server::error::{ServerError, ServerResult};
use crate::server::http_server::serve_http;
use crate::server::lifecycle::drain_background_tasks;

/// Serves `app` until a shutdown signal, then drains the background tasks
/// spawned on `tracker`.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails while
/// running.
pub async fn serve(app: Router, config: &ServerConfig, tracker: TaskTracker) -> ServerResult<()> {
    serve_http(app, config).await?;
    drain_background_tasks(&tracker, config.shutdown_timeout()).await;
    Ok(())
}
