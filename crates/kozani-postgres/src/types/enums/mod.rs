//! Rust mirrors of PostgreSQL enum types.

mod message_role;

pub use message_role::MessageRole;
