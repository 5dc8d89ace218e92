//! Messages of one session, oldest first

use super::super::types::{fetch_messages, ChatMessage, SessionRecord};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMessagesQuery {
    #[serde(skip)]
    pub user_id: Uuid,
    pub session_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum ListMessagesError {
    #[error("Session '{0}' not found")]
    SessionNotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Vec<ChatMessage>, ListMessagesError>> for ListMessagesQuery {}

impl crate::cqrs::middleware::Query for ListMessagesQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListMessagesQuery,
) -> Result<Vec<ChatMessage>, ListMessagesError> {
    let session = SessionRecord::find_owned(&pool, query.user_id, query.session_id)
        .await?
        .ok_or(ListMessagesError::SessionNotFound(query.session_id))?;

    Ok(fetch_messages(&pool, session.id).await?)
}
