//! Delete a session; its messages go with it

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSessionCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSessionResponse {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteSessionError {
    #[error("Session '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteSessionResponse, DeleteSessionError>> for DeleteSessionCommand {}

impl crate::cqrs::middleware::Command for DeleteSessionCommand {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: DeleteSessionCommand,
) -> Result<DeleteSessionResponse, DeleteSessionError> {
    let result = sqlx::query("DELETE FROM chat_sessions WHERE id = $1 AND user_id = $2")
        .bind(command.id)
        .bind(command.user_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DeleteSessionError::NotFound(command.id));
    }

    tracing::info!(session_id = %command.id, "Chat session deleted");

    Ok(DeleteSessionResponse { id: command.id })
}
