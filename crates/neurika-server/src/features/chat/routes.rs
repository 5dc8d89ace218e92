//! Chat API routes
//!
//! - `POST /api/v1/chat/ask` - Ask a question (creates a session when none is given)
//! - `POST /api/v1/chat/sessions` - Create a session
//! - `GET /api/v1/chat/sessions` - List sessions, most recently active first
//! - `GET /api/v1/chat/sessions/:id` - Session metadata
//! - `PATCH /api/v1/chat/sessions/:id` - Rename
//! - `DELETE /api/v1/chat/sessions/:id` - Delete with its messages
//! - `GET /api/v1/chat/sessions/:id/messages` - Message history, oldest first

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::auth::AuthUser;
use crate::features::{FeatureSettings, FeatureState};
use crate::llm::CompletionProvider;
use crate::storage::Storage;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use neurika_analysis::ResponseFormatter;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    commands::{
        ask::AskDeps, AskQuestionCommand, AskQuestionError, CreateSessionCommand,
        CreateSessionError, DeleteSessionCommand, DeleteSessionError, RenameSessionCommand,
        RenameSessionError,
    },
    queries::{
        GetSessionError, GetSessionQuery, ListMessagesError, ListMessagesQuery,
        ListSessionsError, ListSessionsQuery,
    },
};

// ============================================================================
// Router Configuration
// ============================================================================

pub fn chat_routes() -> Router<FeatureState> {
    Router::new()
        .route("/ask", post(ask_question))
        .route("/sessions", get(list_sessions).post(create_session))
        .route(
            "/sessions/:id",
            get(get_session).patch(rename_session).delete(delete_session),
        )
        .route("/sessions/:id/messages", get(list_messages))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// `POST /api/v1/chat/ask`
///
/// - `200 OK` - answer stored; includes the dataset profile on a session's first turn
/// - `400 Bad Request` - empty or over-long question
/// - `404 Not Found` - unknown session or dataset
/// - `502 Bad Gateway` - the completion provider failed
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
async fn ask_question(
    user: AuthUser,
    State(pool): State<PgPool>,
    State(storage): State<Storage>,
    State(provider): State<Arc<dyn CompletionProvider>>,
    State(formatter): State<Arc<ResponseFormatter>>,
    State(settings): State<FeatureSettings>,
    Json(mut command): Json<AskQuestionCommand>,
) -> Result<Response, ChatApiError> {
    command.user_id = user.id;

    let deps = AskDeps {
        storage: &storage,
        provider: provider.as_ref(),
        formatter: formatter.as_ref(),
        settings,
    };

    let response = super::commands::ask::handle(pool, deps, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool, command), fields(user_id = %user.id))]
async fn create_session(
    user: AuthUser,
    State(pool): State<PgPool>,
    Json(mut command): Json<CreateSessionCommand>,
) -> Result<Response, ChatApiError> {
    command.user_id = user.id;

    let session = super::commands::create_session::handle(pool, command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(session))).into_response())
}

#[tracing::instrument(skip(pool, command), fields(user_id = %user.id))]
async fn rename_session(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(mut command): Json<RenameSessionCommand>,
) -> Result<Response, ChatApiError> {
    command.user_id = user.id;
    command.id = id;

    let session = super::commands::rename_session::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(session))).into_response())
}

#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn delete_session(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Response, ChatApiError> {
    let command = DeleteSessionCommand {
        user_id: user.id,
        id,
    };

    let response = super::commands::delete_session::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn list_sessions(
    user: AuthUser,
    State(pool): State<PgPool>,
    Query(mut query): Query<ListSessionsQuery>,
) -> Result<Response, ChatApiError> {
    query.user_id = user.id;

    let page = super::queries::list_sessions::handle(pool, query).await?;

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
async fn get_session(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Response, ChatApiError> {
    let query = GetSessionQuery {
        user_id: user.id,
        id,
    };

    let session = super::queries::get_session::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(session))).into_response())
}

#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn list_messages(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, ChatApiError> {
    let query = ListMessagesQuery {
        user_id: user.id,
        session_id,
    };

    let messages = super::queries::list_messages::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(messages))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum ChatApiError {
    Ask(AskQuestionError),
    Create(CreateSessionError),
    Rename(RenameSessionError),
    Delete(DeleteSessionError),
    List(ListSessionsError),
    Get(GetSessionError),
    Messages(ListMessagesError),
}

impl From<AskQuestionError> for ChatApiError {
    fn from(err: AskQuestionError) -> Self {
        Self::Ask(err)
    }
}

impl From<CreateSessionError> for ChatApiError {
    fn from(err: CreateSessionError) -> Self {
        Self::Create(err)
    }
}

impl From<RenameSessionError> for ChatApiError {
    fn from(err: RenameSessionError) -> Self {
        Self::Rename(err)
    }
}

impl From<DeleteSessionError> for ChatApiError {
    fn from(err: DeleteSessionError) -> Self {
        Self::Delete(err)
    }
}

impl From<ListSessionsError> for ChatApiError {
    fn from(err: ListSessionsError) -> Self {
        Self::List(err)
    }
}

impl From<GetSessionError> for ChatApiError {
    fn from(err: GetSessionError) -> Self {
        Self::Get(err)
    }
}

impl From<ListMessagesError> for ChatApiError {
    fn from(err: ListMessagesError) -> Self {
        Self::Messages(err)
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ChatApiError::Ask(AskQuestionError::Invalid(_))
            | ChatApiError::Create(CreateSessionError::Invalid(_))
            | ChatApiError::Rename(RenameSessionError::Invalid(_))
            | ChatApiError::List(ListSessionsError::InvalidPagination(_)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", self.to_string()),
            ),
            ChatApiError::Ask(AskQuestionError::SessionNotFound(_))
            | ChatApiError::Ask(AskQuestionError::DatasetNotFound(_))
            | ChatApiError::Create(CreateSessionError::DatasetNotFound(_))
            | ChatApiError::Rename(RenameSessionError::NotFound(_))
            | ChatApiError::Delete(DeleteSessionError::NotFound(_))
            | ChatApiError::Get(GetSessionError::NotFound(_))
            | ChatApiError::Messages(ListMessagesError::SessionNotFound(_)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", self.to_string()),
            ),
            ChatApiError::Ask(AskQuestionError::Completion(_)) => {
                tracing::error!("Completion error: {}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new("UPSTREAM_ERROR", "The analysis service is unavailable"),
                )
            },
            ChatApiError::Ask(AskQuestionError::Storage(_)) => {
                tracing::error!("Storage error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("STORAGE_ERROR", "A storage error occurred"),
                )
            },
            ChatApiError::Ask(AskQuestionError::Corrupt(_))
            | ChatApiError::Ask(AskQuestionError::Database(_))
            | ChatApiError::Create(CreateSessionError::Database(_))
            | ChatApiError::Rename(RenameSessionError::Database(_))
            | ChatApiError::Delete(DeleteSessionError::Database(_))
            | ChatApiError::List(ListSessionsError::Database(_))
            | ChatApiError::Get(GetSessionError::Database(_))
            | ChatApiError::Messages(ListMessagesError::Database(_)) => {
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

impl std::fmt::Display for ChatApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatApiError::Ask(e) => write!(f, "{}", e),
            ChatApiError::Create(e) => write!(f, "{}", e),
            ChatApiError::Rename(e) => write!(f, "{}", e),
            ChatApiError::Delete(e) => write!(f, "{}", e),
            ChatApiError::List(e) => write!(f, "{}", e),
            ChatApiError::Get(e) => write!(f, "{}", e),
            ChatApiError::Messages(e) => write!(f, "{}", e),
        }
    }
}
