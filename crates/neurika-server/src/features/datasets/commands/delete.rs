//! Delete dataset command
//!
//! Removes the stored object, then the row. Sessions that referenced the
//! dataset keep their history with `file_id` cleared.

use super::super::types::DatasetRecord;
use crate::storage::Storage;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDatasetCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDatasetResponse {
    pub id: Uuid,
    pub file_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteDatasetError {
    #[error("Dataset '{0}' not found")]
    NotFound(Uuid),
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteDatasetResponse, DeleteDatasetError>> for DeleteDatasetCommand {}

impl crate::cqrs::middleware::Command for DeleteDatasetCommand {}

#[tracing::instrument(skip(pool, storage))]
pub async fn handle(
    pool: PgPool,
    storage: Storage,
    command: DeleteDatasetCommand,
) -> Result<DeleteDatasetResponse, DeleteDatasetError> {
    let record = DatasetRecord::find_owned(&pool, command.user_id, command.id)
        .await?
        .ok_or(DeleteDatasetError::NotFound(command.id))?;

    storage.delete(&record.file_path).await?;

    sqlx::query("DELETE FROM uploaded_files WHERE id = $1 AND user_id = $2")
        .bind(record.id)
        .bind(command.user_id)
        .execute(&pool)
        .await?;

    Ok(DeleteDatasetResponse {
        id: record.id,
        file_name: record.file_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_not_deserialized() {
        let owner = Uuid::new_v4();
        let cmd: DeleteDatasetCommand = serde_json::from_value(serde_json::json!({
            "user_id": owner,
            "id": Uuid::nil(),
        }))
        .unwrap();
        assert_eq!(cmd.user_id, Uuid::nil());
    }
}
