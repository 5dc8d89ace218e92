//! Dataset overview query
//!
//! Downloads the stored file, parses it and profiles every column. A file
//! without a header and at least one data row yields the `no_data` status.

use super::super::types::DatasetRecord;
use crate::storage::Storage;
use mediator::Request;
use neurika_analysis::{tabular::TabularError, DatasetOverview, ParseOptions};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDatasetOverviewQuery {
    #[serde(skip)]
    pub user_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetOverviewResponse {
    pub dataset: DatasetRecord,
    pub overview: DatasetOverview,
}

#[derive(Debug, thiserror::Error)]
pub enum GetDatasetOverviewError {
    #[error("Dataset '{0}' not found")]
    NotFound(Uuid),
    #[error("Profiling is only supported for CSV files, not '{0}'")]
    UnsupportedFormat(String),
    #[error("Dataset could not be parsed: {0}")]
    Parse(#[from] TabularError),
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DatasetOverviewResponse, GetDatasetOverviewError>> for GetDatasetOverviewQuery {}

impl crate::cqrs::middleware::Query for GetDatasetOverviewQuery {}

#[tracing::instrument(skip(pool, storage))]
pub async fn handle(
    pool: PgPool,
    storage: Storage,
    query: GetDatasetOverviewQuery,
) -> Result<DatasetOverviewResponse, GetDatasetOverviewError> {
    let dataset = DatasetRecord::find_owned(&pool, query.user_id, query.id)
        .await?
        .ok_or(GetDatasetOverviewError::NotFound(query.id))?;

    if !dataset.format().is_some_and(|f| f.is_tabular_text()) {
        return Err(GetDatasetOverviewError::UnsupportedFormat(dataset.file_name));
    }

    let text = storage.download_text(&dataset.file_path).await?;
    let overview = neurika_analysis::overview(&text, &ParseOptions::default())?;

    if let DatasetOverview::Ready(profile) = &overview {
        tracing::debug!(
            rows = profile.total_rows,
            columns = profile.total_columns,
            numeric = profile.numeric_columns.len(),
            "Dataset profiled"
        );
    }

    Ok(DatasetOverviewResponse { dataset, overview })
}
