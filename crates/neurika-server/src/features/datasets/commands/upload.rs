//! Upload dataset command
//!
//! Stores the raw bytes under the caller's prefix in object storage and
//! records the metadata row. If the row cannot be written the object is
//! removed again.

use super::super::types::{DatasetFormat, DatasetRecord, DATASET_COLUMNS};
use crate::storage::{build_dataset_key, Storage};
use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

pub const FILE_NAME_MAX_CHARS: usize = 255;

#[derive(Clone)]
pub struct UploadDatasetCommand {
    pub user_id: Uuid,
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub max_bytes: usize,
}

impl std::fmt::Debug for UploadDatasetCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadDatasetCommand")
            .field("user_id", &self.user_id)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadDatasetResponse {
    pub id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub format: DatasetFormat,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadDatasetError {
    #[error("A file field named 'file' is required")]
    FileMissing,
    #[error("File name is required and cannot be empty")]
    FileNameRequired,
    #[error("File name must not exceed 255 characters")]
    FileNameLength,
    #[error("The uploaded file is empty")]
    Empty,
    #[error("File exceeds the upload limit of {max_bytes} bytes")]
    TooLarge { max_bytes: usize },
    #[error("Unsupported file type '{0}'; upload a .csv, .xls or .xlsx file")]
    UnsupportedType(String),
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<UploadDatasetResponse, UploadDatasetError>> for UploadDatasetCommand {}

impl crate::cqrs::middleware::Command for UploadDatasetCommand {}

impl UploadDatasetCommand {
    /// Validate the upload and return its detected format
    pub fn validate(&self) -> Result<DatasetFormat, UploadDatasetError> {
        if self.file_name.trim().is_empty() {
            return Err(UploadDatasetError::FileNameRequired);
        }
        if self.file_name.chars().count() > FILE_NAME_MAX_CHARS {
            return Err(UploadDatasetError::FileNameLength);
        }
        if self.data.is_empty() {
            return Err(UploadDatasetError::Empty);
        }
        if self.data.len() > self.max_bytes {
            return Err(UploadDatasetError::TooLarge {
                max_bytes: self.max_bytes,
            });
        }
        DatasetFormat::detect(&self.file_name, self.content_type.as_deref())
            .ok_or_else(|| UploadDatasetError::UnsupportedType(self.file_name.clone()))
    }
}

#[tracing::instrument(skip(pool, storage))]
pub async fn handle(
    pool: PgPool,
    storage: Storage,
    command: UploadDatasetCommand,
) -> Result<UploadDatasetResponse, UploadDatasetError> {
    let format = command.validate()?;

    let file_name = command.file_name.trim().to_string();
    let key = build_dataset_key(command.user_id, Utc::now().timestamp_millis(), &file_name);
    let mime_type = command
        .content_type
        .filter(|ct| DatasetFormat::detect("", Some(ct)).is_some())
        .unwrap_or_else(|| format.default_mime().to_string());

    let uploaded = storage
        .upload(&key, command.data, Some(mime_type.clone()))
        .await?;

    let inserted = sqlx::query_as::<_, DatasetRecord>(&format!(
        "INSERT INTO uploaded_files (user_id, file_name, file_path, file_size, mime_type, checksum)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        DATASET_COLUMNS
    ))
    .bind(command.user_id)
    .bind(&file_name)
    .bind(&uploaded.key)
    .bind(uploaded.size)
    .bind(&mime_type)
    .bind(&uploaded.checksum)
    .fetch_one(&pool)
    .await;

    let record = match inserted {
        Ok(record) => record,
        Err(e) => {
            if let Err(cleanup) = storage.delete(&uploaded.key).await {
                tracing::warn!(key = %uploaded.key, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        },
    };

    Ok(UploadDatasetResponse {
        id: record.id,
        file_name: record.file_name,
        file_path: record.file_path,
        file_size: record.file_size,
        mime_type: record.mime_type,
        format,
        created_at: record.created_at,
    })
}
