use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteQaPairCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteQaPairResponse {
    pub id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteQaPairError {
    #[error("Q&A pair '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteQaPairResponse, DeleteQaPairError>> for DeleteQaPairCommand {}

impl crate::cqrs::middleware::Command for DeleteQaPairCommand {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: DeleteQaPairCommand,
) -> Result<DeleteQaPairResponse, DeleteQaPairError> {
    let result = sqlx::query("DELETE FROM qa_pairs WHERE id = $1 AND user_id = $2")
        .bind(command.id)
        .bind(command.user_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DeleteQaPairError::NotFound(command.id));
    }

    Ok(DeleteQaPairResponse { id: command.id })
}
