//! Request types for HTTP handlers.

mod authentications;
mod chats;
mod validations;

pub use authentications::*;
pub use chats::*;
