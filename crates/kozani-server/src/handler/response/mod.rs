//! Response types for HTTP handlers.

mod authentications;
mod chats;
mod errors;
mod monitors;

pub use authentications::*;
pub use chats::*;
pub use errors::*;
pub use monitors::*;
