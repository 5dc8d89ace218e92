//! Predefined answer routes
//!
//! - `POST /api/v1/qa-pairs` - Create
//! - `GET /api/v1/qa-pairs` - List, newest first
//! - `POST /api/v1/qa-pairs/match` - Which pair would answer a question
//! - `GET /api/v1/qa-pairs/:id` - Fetch one
//! - `PATCH /api/v1/qa-pairs/:id` - Partial update, including the active toggle
//! - `DELETE /api/v1/qa-pairs/:id` - Delete

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::auth::AuthUser;
use crate::features::FeatureState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    commands::{
        CreateQaPairCommand, CreateQaPairError, DeleteQaPairCommand, DeleteQaPairError,
        UpdateQaPairCommand, UpdateQaPairError,
    },
    queries::{
        GetQaPairError, GetQaPairQuery, ListQaPairsError, ListQaPairsQuery, MatchQaPairError,
        MatchQaPairQuery,
    },
};

// ============================================================================
// Router Configuration
// ============================================================================

pub fn qa_pairs_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_qa_pairs).post(create_qa_pair))
        .route("/match", post(match_qa_pair))
        .route(
            "/:id",
            get(get_qa_pair).patch(update_qa_pair).delete(delete_qa_pair),
        )
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

#[tracing::instrument(skip(pool, command), fields(user_id = %user.id))]
async fn create_qa_pair(
    user: AuthUser,
    State(pool): State<PgPool>,
    Json(mut command): Json<CreateQaPairCommand>,
) -> Result<Response, QaPairApiError> {
    command.user_id = user.id;

    let record = super::commands::create::handle(pool, command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(pool, command), fields(user_id = %user.id))]
async fn update_qa_pair(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateQaPairCommand>,
) -> Result<Response, QaPairApiError> {
    command.user_id = user.id;
    command.id = id;

    let record = super::commands::update::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn delete_qa_pair(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Response, QaPairApiError> {
    let command = DeleteQaPairCommand {
        user_id: user.id,
        id,
    };

    let response = super::commands::delete::handle(pool, command).await?;

    tracing::info!(qa_pair_id = %response.id, "Q&A pair deleted via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn list_qa_pairs(
    user: AuthUser,
    State(pool): State<PgPool>,
    Query(mut query): Query<ListQaPairsQuery>,
) -> Result<Response, QaPairApiError> {
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

#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn get_qa_pair(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Response, QaPairApiError> {
    let query = GetQaPairQuery {
        user_id: user.id,
        id,
    };

    let record = super::queries::get::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(record))).into_response())
}

#[tracing::instrument(skip(pool, query), fields(user_id = %user.id))]
async fn match_qa_pair(
    user: AuthUser,
    State(pool): State<PgPool>,
    Json(mut query): Json<MatchQaPairQuery>,
) -> Result<Response, QaPairApiError> {
    query.user_id = user.id;

    let response = super::queries::match_question::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum QaPairApiError {
    Create(CreateQaPairError),
    Update(UpdateQaPairError),
    Delete(DeleteQaPairError),
    List(ListQaPairsError),
    Get(GetQaPairError),
    Match(MatchQaPairError),
}

impl From<CreateQaPairError> for QaPairApiError {
    fn from(err: CreateQaPairError) -> Self {
        Self::Create(err)
    }
}

impl From<UpdateQaPairError> for QaPairApiError {
    fn from(err: UpdateQaPairError) -> Self {
        Self::Update(err)
    }
}

impl From<DeleteQaPairError> for QaPairApiError {
    fn from(err: DeleteQaPairError) -> Self {
        Self::Delete(err)
    }
}

impl From<ListQaPairsError> for QaPairApiError {
    fn from(err: ListQaPairsError) -> Self {
        Self::List(err)
    }
}

impl From<GetQaPairError> for QaPairApiError {
    fn from(err: GetQaPairError) -> Self {
        Self::Get(err)
    }
}

impl From<MatchQaPairError> for QaPairApiError {
    fn from(err: MatchQaPairError) -> Self {
        Self::Match(err)
    }
}

impl IntoResponse for QaPairApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            QaPairApiError::Create(CreateQaPairError::Incomplete)
            | QaPairApiError::Create(CreateQaPairError::Invalid(_))
            | QaPairApiError::Update(UpdateQaPairError::NoKeywords)
            | QaPairApiError::Update(UpdateQaPairError::Invalid(_))
            | QaPairApiError::List(ListQaPairsError::InvalidPagination(_))
            | QaPairApiError::Match(MatchQaPairError::Invalid(_)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", self.to_string()),
            ),
            QaPairApiError::Update(UpdateQaPairError::NotFound(_))
            | QaPairApiError::Delete(DeleteQaPairError::NotFound(_))
            | QaPairApiError::Get(GetQaPairError::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", self.to_string()),
            ),
            QaPairApiError::Create(CreateQaPairError::Database(_))
            | QaPairApiError::Update(UpdateQaPairError::Database(_))
            | QaPairApiError::Delete(DeleteQaPairError::Database(_))
            | QaPairApiError::List(ListQaPairsError::Database(_))
            | QaPairApiError::Get(GetQaPairError::Database(_))
            | QaPairApiError::Match(MatchQaPairError::Database(_)) => {
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

impl std::fmt::Display for QaPairApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QaPairApiError::Create(e) => write!(f, "{}", e),
            QaPairApiError::Update(e) => write!(f, "{}", e),
            QaPairApiError::Delete(e) => write!(f, "{}", e),
            QaPairApiError::List(e) => write!(f, "{}", e),
            QaPairApiError::Get(e) => write!(f, "{}", e),
            QaPairApiError::Match(e) => write!(f, "{}", e),
        }
    }
}
