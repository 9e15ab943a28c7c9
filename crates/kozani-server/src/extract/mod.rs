//! Request extractors with JSON error envelopes.
//!
//! - [`Json`] maps body rejections to `400` [`ErrorResponse`]s.
//! - [`ValidateJson`] additionally runs `validator` rules on the body.
//!
//! [`ErrorResponse`]: crate::handler::response::ErrorResponse

mod reject;

pub use crate::extract::reject::{Json, ValidateJson};
