use super::super::types::DatasetRecord;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDatasetQuery {
    #[serde(skip)]
    pub user_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum GetDatasetError {
    #[error("Dataset '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DatasetRecord, GetDatasetError>> for GetDatasetQuery {}

impl crate::cqrs::middleware::Query for GetDatasetQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetDatasetQuery) -> Result<DatasetRecord, GetDatasetError> {
    DatasetRecord::find_owned(&pool, query.user_id, query.id)
        .await?
        .ok_or(GetDatasetError::NotFound(query.id))
}
