use super::super::types::SessionRecord;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSessionQuery {
    #[serde(skip)]
    pub user_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum GetSessionError {
    #[error("Session '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<SessionRecord, GetSessionError>> for GetSessionQuery {}

impl crate::cqrs::middleware::Query for GetSessionQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetSessionQuery) -> Result<SessionRecord, GetSessionError> {
    SessionRecord::find_owned(&pool, query.user_id, query.id)
        .await?
        .ok_or(GetSessionError::NotFound(query.id))
}
