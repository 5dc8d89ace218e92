//! The caller's sessions, most recently active first

use super::super::types::{SessionRecord, SESSION_COLUMNS};
use crate::features::shared::{Paginated, PaginationParams};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSessionsQuery {
    #[serde(skip)]
    pub user_id: Uuid,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Only sessions about this dataset
    pub file_id: Option<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListSessionsError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Paginated<SessionRecord>, ListSessionsError>> for ListSessionsQuery {}

impl crate::cqrs::middleware::Query for ListSessionsQuery {}

impl ListSessionsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn validate(&self) -> Result<(), ListSessionsError> {
        self.pagination()
            .validate()
            .map_err(ListSessionsError::InvalidPagination)
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListSessionsQuery,
) -> Result<Paginated<SessionRecord>, ListSessionsError> {
    query.validate()?;
    let params = query.pagination();

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM chat_sessions
         WHERE user_id = $1 AND ($2::UUID IS NULL OR file_id = $2)",
    )
    .bind(query.user_id)
    .bind(query.file_id)
    .fetch_one(&pool)
    .await?;

    let items = sqlx::query_as::<_, SessionRecord>(&format!(
        "SELECT {} FROM chat_sessions
         WHERE user_id = $1 AND ($2::UUID IS NULL OR file_id = $2)
         ORDER BY updated_at DESC, id
         LIMIT $3 OFFSET $4",
        SESSION_COLUMNS
    ))
    .bind(query.user_id)
    .bind(query.file_id)
    .bind(params.per_page())
    .bind(params.offset())
    .fetch_all(&pool)
    .await?;

    Ok(Paginated::from_items(items, &params, total))
}
