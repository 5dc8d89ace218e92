//! Dataset API routes
//!
//! - `POST /api/v1/datasets` - Upload a dataset (multipart field `file`)
//! - `GET /api/v1/datasets` - List the caller's datasets
//! - `GET /api/v1/datasets/:id` - Dataset metadata
//! - `GET /api/v1/datasets/:id/overview` - Column profile of a CSV dataset
//! - `DELETE /api/v1/datasets/:id` - Delete a dataset and its stored object

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::auth::AuthUser;
use crate::features::{FeatureSettings, FeatureState};
use crate::storage::Storage;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    commands::{DeleteDatasetCommand, DeleteDatasetError, UploadDatasetCommand, UploadDatasetError},
    queries::{
        GetDatasetError, GetDatasetOverviewError, GetDatasetOverviewQuery, GetDatasetQuery,
        ListDatasetsError, ListDatasetsQuery,
    },
};

// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

// ============================================================================
// Router Configuration
// ============================================================================

pub fn datasets_routes(upload_max_bytes: usize) -> Router<FeatureState> {
    Router::new()
        .route(
            "/",
            get(list_datasets)
                .post(upload_dataset)
                .layer(DefaultBodyLimit::max(upload_max_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES))),
        )
        .route("/:id", get(get_dataset).delete(delete_dataset))
        .route("/:id/overview", get(get_dataset_overview))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// `POST /api/v1/datasets`
///
/// - `201 Created` - stored and recorded
/// - `400 Bad Request` - missing, empty or unsupported file
/// - `413 Payload Too Large` - file over the upload limit
#[tracing::instrument(skip(pool, storage, settings, multipart), fields(user_id = %user.id))]
async fn upload_dataset(
    user: AuthUser,
    State(pool): State<PgPool>,
    State(storage): State<Storage>,
    State(settings): State<FeatureSettings>,
    mut multipart: Multipart,
) -> Result<Response, DatasetApiError> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DatasetApiError::Multipart(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| DatasetApiError::Multipart(e.body_text()))?;
        file = Some((file_name, content_type, data.to_vec()));
        break;
    }

    let (file_name, content_type, data) = file.ok_or(UploadDatasetError::FileMissing)?;

    let command = UploadDatasetCommand {
        user_id: user.id,
        file_name,
        content_type,
        data,
        max_bytes: settings.upload_max_bytes,
    };

    let response = super::commands::upload::handle(pool, storage, command).await?;

    tracing::info!(
        dataset_id = %response.id,
        file_path = %response.file_path,
        size = response.file_size,
        "Dataset uploaded via API"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// `DELETE /api/v1/datasets/:id`
#[tracing::instrument(skip(pool, storage), fields(user_id = %user.id))]
async fn delete_dataset(
    user: AuthUser,
    State(pool): State<PgPool>,
    State(storage): State<Storage>,
    Path(id): Path<Uuid>,
) -> Result<Response, DatasetApiError> {
    let command = DeleteDatasetCommand {
        user_id: user.id,
        id,
    };

    let response = super::commands::delete::handle(pool, storage, command).await?;

    tracing::info!(dataset_id = %response.id, "Dataset deleted via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// `GET /api/v1/datasets?page=&per_page=`
#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn list_datasets(
    user: AuthUser,
    State(pool): State<PgPool>,
    Query(mut query): Query<ListDatasetsQuery>,
) -> Result<Response, DatasetApiError> {
    query.user_id = user.id;

    let page = super::queries::list::handle(pool, query).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(
            page.items,
            json!({ "pagination": page.pagination }),
        )),
    )
        .into_response())
}

/// `GET /api/v1/datasets/:id`
#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn get_dataset(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Response, DatasetApiError> {
    let query = GetDatasetQuery {
        user_id: user.id,
        id,
    };

    let dataset = super::queries::get::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(dataset))).into_response())
}

/// `GET /api/v1/datasets/:id/overview`
///
/// - `200 OK` - `{ "status": "ready", "profile": ... }` or `{ "status": "no_data" }`
/// - `422 Unprocessable Entity` - not a CSV file, or malformed CSV
#[tracing::instrument(skip(pool, storage), fields(user_id = %user.id))]
async fn get_dataset_overview(
    user: AuthUser,
    State(pool): State<PgPool>,
    State(storage): State<Storage>,
    Path(id): Path<Uuid>,
) -> Result<Response, DatasetApiError> {
    let query = GetDatasetOverviewQuery {
        user_id: user.id,
        id,
    };

    let response = super::queries::overview::handle(pool, storage, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum DatasetApiError {
    Multipart(String),
    Upload(UploadDatasetError),
    Delete(DeleteDatasetError),
    List(ListDatasetsError),
    Get(GetDatasetError),
    Overview(GetDatasetOverviewError),
}

impl From<UploadDatasetError> for DatasetApiError {
    fn from(err: UploadDatasetError) -> Self {
        Self::Upload(err)
    }
}

impl From<DeleteDatasetError> for DatasetApiError {
    fn from(err: DeleteDatasetError) -> Self {
        Self::Delete(err)
    }
}

impl From<ListDatasetsError> for DatasetApiError {
    fn from(err: ListDatasetsError) -> Self {
        Self::List(err)
    }
}

impl From<GetDatasetError> for DatasetApiError {
    fn from(err: GetDatasetError) -> Self {
        Self::Get(err)
    }
}

impl From<GetDatasetOverviewError> for DatasetApiError {
    fn from(err: GetDatasetOverviewError) -> Self {
        Self::Overview(err)
    }
}

impl IntoResponse for DatasetApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            DatasetApiError::Multipart(_)
            | DatasetApiError::Upload(UploadDatasetError::FileMissing)
            | DatasetApiError::Upload(UploadDatasetError::FileNameRequired)
            | DatasetApiError::Upload(UploadDatasetError::FileNameLength)
            | DatasetApiError::Upload(UploadDatasetError::Empty)
            | DatasetApiError::Upload(UploadDatasetError::UnsupportedType(_))
            | DatasetApiError::List(ListDatasetsError::InvalidPagination(_)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", self.to_string()),
            ),
            DatasetApiError::Upload(UploadDatasetError::TooLarge { .. }) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse::new("PAYLOAD_TOO_LARGE", self.to_string()),
            ),
            DatasetApiError::Delete(DeleteDatasetError::NotFound(_))
            | DatasetApiError::Get(GetDatasetError::NotFound(_))
            | DatasetApiError::Overview(GetDatasetOverviewError::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", self.to_string()),
            ),
            DatasetApiError::Overview(GetDatasetOverviewError::UnsupportedFormat(_))
            | DatasetApiError::Overview(GetDatasetOverviewError::Parse(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new("UNSUPPORTED_DATASET", self.to_string()),
            ),
            DatasetApiError::Upload(UploadDatasetError::Storage(_))
            | DatasetApiError::Delete(DeleteDatasetError::Storage(_))
            | DatasetApiError::Overview(GetDatasetOverviewError::Storage(_)) => {
                tracing::error!("Storage error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("STORAGE_ERROR", "A storage error occurred"),
                )
            },
            DatasetApiError::Upload(UploadDatasetError::Database(_))
            | DatasetApiError::Delete(DeleteDatasetError::Database(_))
            | DatasetApiError::List(ListDatasetsError::Database(_))
            | DatasetApiError::Get(GetDatasetError::Database(_))
            | DatasetApiError::Overview(GetDatasetOverviewError::Database(_)) => {
                tracing::error!("Database error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "A database error occurred"),
                )
            },
        };

        (status, Json(error)).into_response()
    }
}

impl std::fmt::Display for DatasetApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetApiError::Multipart(msg) => write!(f, "Invalid multipart body: {}", msg),
            DatasetApiError::Upload(e) => write!(f, "{}", e),
            DatasetApiError::Delete(e) => write!(f, "{}", e),
            DatasetApiError::List(e) => write!(f, "{}", e),
            DatasetApiError::Get(e) => write!(f, "{}", e),
            DatasetApiError::Overview(e) => write!(f, "{}", e),
        }
    }
}
