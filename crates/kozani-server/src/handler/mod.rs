//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod chat;
mod error;
mod monitors;
pub mod request;
pub mod response;

use aide::axum::ApiRouter;
use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::middleware::{OpenApiConfig, RouterOpenApiExt};
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with every route, the OpenAPI document and a JSON
/// `404` fallback.
pub fn routes(config: OpenApiConfig) -> Router<ServiceState> {
    ApiRouter::new()
        .merge(monitors::routes())
        .merge(authentication::routes())
        .merge(chat::routes())
        .with_open_api(config)
        .fallback(fallback)
}
