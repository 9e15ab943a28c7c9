//! OpenAI chat-completions client.

mod client;
mod completion;
mod config;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
