//! Database query repositories implemented on [`PgConnection`].
//!
//! [`PgConnection`]: crate::PgConnection

mod message;
mod monitor;
mod user;

pub use message::MessageRepository;
pub use monitor::MonitorRepository;
pub use user::UserRepository;
