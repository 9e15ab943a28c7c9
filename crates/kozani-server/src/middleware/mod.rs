//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Layers are applied from the innermost outwards:
//!
//! ```rust,ignore
//! let app = routes(open_api_config)
//!     .with_state(state)
//!     .with_security(&cors_config, &SecurityHeadersConfig::default())
//!     .with_observability()
//!     .with_recovery(&recovery_config);
//! ```

mod observability;
mod recovery;
mod security;
mod specification;

pub use crate::middleware::observability::RouterObservabilityExt;
pub use crate::middleware::recovery::{RecoveryConfig, RouterRecoveryExt};
pub use crate::middleware::security::{
    CorsConfig, FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig,
};
pub use crate::middleware::specification::{OpenApiConfig, RouterOpenApiExt};
