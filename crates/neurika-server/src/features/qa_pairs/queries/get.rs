use super::super::types::QaPairRecord;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetQaPairQuery {
    #[serde(skip)]
    pub user_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum GetQaPairError {
    #[error("Q&A pair '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<QaPairRecord, GetQaPairError>> for GetQaPairQuery {}

impl crate::cqrs::middleware::Query for GetQaPairQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetQaPairQuery) -> Result<QaPairRecord, GetQaPairError> {
    QaPairRecord::find_owned(&pool, query.user_id, query.id)
        .await?
        .ok_or(GetQaPairError::NotFound(query.id))
}
