//! Analysis sessions and question answering
//!
//! A session groups the messages of one conversation, optionally about one
//! uploaded dataset. Asking a question appends a user message and an
//! assistant message; messages are never edited.

pub mod commands;
pub mod pipeline;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::chat_routes;
pub use types::{ChatMessage, SessionRecord};
