//! Database models for all tables.

mod message;
mod user;

pub use message::{Message, NewMessage};
pub use user::{NewUser, User};
