//! List the caller's datasets, newest first

use super::super::types::{DatasetRecord, DATASET_COLUMNS};
use crate::features::shared::{Paginated, PaginationParams};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDatasetsQuery {
    #[serde(skip)]
    pub user_id: Uuid,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListDatasetsError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Paginated<DatasetRecord>, ListDatasetsError>> for ListDatasetsQuery {}

impl crate::cqrs::middleware::Query for ListDatasetsQuery {}

impl ListDatasetsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }

    pub fn validate(&self) -> Result<(), ListDatasetsError> {
        self.pagination()
            .validate()
            .map_err(ListDatasetsError::InvalidPagination)
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListDatasetsQuery,
) -> Result<Paginated<DatasetRecord>, ListDatasetsError> {
    query.validate()?;
    let params = query.pagination();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM uploaded_files WHERE user_id = $1")
        .bind(query.user_id)
        .fetch_one(&pool)
        .await?;

    let items = sqlx::query_as::<_, DatasetRecord>(&format!(
        "SELECT {} FROM uploaded_files WHERE user_id = $1
         ORDER BY created_at DESC, id
         LIMIT $2 OFFSET $3",
        DATASET_COLUMNS
    ))
    .bind(query.user_id)
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
    fn test_validate_rejects_bad_page() {
        let query = ListDatasetsQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(matches!(query.validate(), Err(ListDatasetsError::InvalidPagination(_))));
    }

    #[test]
    fn test_default_pagination() {
        let params = ListDatasetsQuery::default().pagination();
        assert_eq!(params.per_page(), 20);
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::features::shared::test_helpers::TestDataset;

    // Requires DATABASE_URL pointing at a disposable PostgreSQL server
    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_lists_only_callers_datasets(pool: PgPool) -> sqlx::Result<()> {
        let user_id = Uuid::new_v4();
        for name in ["a.csv", "b.csv", "c.csv"] {
            TestDataset::new(user_id, name).insert(&pool).await?;
        }
        TestDataset::new(Uuid::new_v4(), "other.csv").insert(&pool).await?;

        let page = handle(
            pool,
            ListDatasetsQuery {
                user_id,
                page: Some(1),
                per_page: Some(2),
            },
        )
        .await
        .unwrap();

        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|d| d.user_id == user_id));
        assert_eq!(page.pagination.total, 3);
        Ok(())
    }
}
