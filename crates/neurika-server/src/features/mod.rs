//! Feature slices of the Neurika API
//!
//! Each slice is organised as:
//! - `commands/` - write operations
//! - `queries/` - read operations
//! - `routes.rs` - HTTP handlers and the slice's `*ApiError`
//!
//! Commands and queries implement `mediator::Request` and the marker traits in
//! [`crate::cqrs::middleware`].
//!
//! # Slices
//!
//! - **datasets**: upload, list, profile and delete uploaded files
//! - **chat**: analysis sessions, message history and question answering
//! - **qa_pairs**: predefined answers that bypass the completion provider
//! - **team**: roles, invitations and membership administration

pub mod chat;
pub mod datasets;
pub mod qa_pairs;
pub mod shared;
pub mod team;

use crate::auth::IdentityClient;
use crate::config::Config;
use crate::llm::CompletionProvider;
use crate::mail::Mailer;
use crate::storage::Storage;
use axum::{extract::FromRef, Router};
use neurika_analysis::ResponseFormatter;
use std::sync::Arc;

/// Limits read by handlers
#[derive(Debug, Clone, Copy)]
pub struct FeatureSettings {
    pub upload_max_bytes: usize,
    /// Characters of raw dataset text sent with each question
    pub dataset_context_chars: usize,
}

impl From<&Config> for FeatureSettings {
    fn from(config: &Config) -> Self {
        Self {
            upload_max_bytes: config.uploads.max_bytes,
            dataset_context_chars: config.uploads.dataset_context_chars,
        }
    }
}

/// Shared state for all feature routes
///
/// Every client is constructed once at startup and handed to handlers
/// through axum's `State` extractor.
#[derive(Clone, FromRef)]
pub struct FeatureState {
    pub db: sqlx::PgPool,
    pub storage: Storage,
    pub identity: IdentityClient,
    pub completion: Arc<dyn CompletionProvider>,
    /// `None` when invitation e-mail is not configured
    pub mailer: Option<Mailer>,
    pub formatter: Arc<ResponseFormatter>,
    pub settings: FeatureSettings,
}

/// Mount every slice under its path prefix:
///
/// - `/datasets`
/// - `/chat`
/// - `/qa-pairs`
/// - `/team`
pub fn router(state: FeatureState) -> Router<()> {
    let upload_max_bytes = state.settings.upload_max_bytes;

    Router::new()
        .nest("/datasets", datasets::datasets_routes(upload_max_bytes))
        .nest("/chat", chat::chat_routes())
        .nest("/qa-pairs", qa_pairs::qa_pairs_routes())
        .nest("/team", team::team_routes())
        .with_state(state)
}
