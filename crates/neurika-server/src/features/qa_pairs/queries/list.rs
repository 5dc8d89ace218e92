//! List the caller's predefined answers, newest first

use super::super::types::{QaPairRecord, QA_PAIR_COLUMNS};
use crate::features::shared::{Paginated, PaginationParams};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQaPairsQuery {
    #[serde(skip)]
    pub user_id: Uuid,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Only active (or only inactive) pairs
    pub active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListQaPairsError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Paginated<QaPairRecord>, ListQaPairsError>> for ListQaPairsQuery {}

impl crate::cqrs::middleware::Query for ListQaPairsQuery {}

impl ListQaPairsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn validate(&self) -> Result<(), ListQaPairsError> {
        self.pagination()
            .validate()
            .map_err(ListQaPairsError::InvalidPagination)
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListQaPairsQuery,
) -> Result<Paginated<QaPairRecord>, ListQaPairsError> {
    query.validate()?;
    let params = query.pagination();

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM qa_pairs
         WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR is_active = $2)",
    )
    .bind(query.user_id)
    .bind(query.active)
    .fetch_one(&pool)
    .await?;

    let items = sqlx::query_as::<_, QaPairRecord>(&format!(
        "SELECT {} FROM qa_pairs
         WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR is_active = $2)
         ORDER BY created_at DESC, id
         LIMIT $3 OFFSET $4",
        QA_PAIR_COLUMNS
    ))
    .bind(query.user_id)
    .bind(query.active)
    .bind(params.per_page())
    .bind(params.offset())
    .fetch_all(&pool)
    .await?;

    Ok(Paginated::from_items(items, &params, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_per_page_bounds() {
        let query = ListQaPairsQuery {
            per_page: Some(101),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }
}
