use super::super::types::{SessionRecord, SESSION_COLUMNS};
use crate::features::shared::validation::{validate_text, TextValidationError, TITLE_MAX_CHARS};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameSessionCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(skip)]
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RenameSessionError {
    #[error(transparent)]
    Invalid(#[from] TextValidationError),
    #[error("Session '{0}' not found")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<SessionRecord, RenameSessionError>> for RenameSessionCommand {}

impl crate::cqrs::middleware::Command for RenameSessionCommand {}

impl RenameSessionCommand {
    pub fn validate(&self) -> Result<(), RenameSessionError> {
        validate_text("title", &self.title, TITLE_MAX_CHARS)?;
        Ok(())
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: RenameSessionCommand,
) -> Result<SessionRecord, RenameSessionError> {
    command.validate()?;

    sqlx::query_as::<_, SessionRecord>(&format!(
        "UPDATE chat_sessions SET title = $3, updated_at = NOW()
         WHERE id = $1 AND user_id = $2
         RETURNING {}",
        SESSION_COLUMNS
    ))
    .bind(command.id)
    .bind(command.user_id)
    .bind(command.title.trim())
    .fetch_optional(&pool)
    .await?
    .ok_or(RenameSessionError::NotFound(command.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bounds() {
        let mut cmd = RenameSessionCommand {
            title: "Q1 revenue".into(),
            ..Default::default()
        };
        assert!(cmd.validate().is_ok());

        cmd.title = "   ".into();
        assert!(cmd.validate().is_err());

        cmd.title = "é".repeat(TITLE_MAX_CHARS);
        assert!(cmd.validate().is_ok());

        cmd.title.push('é');
        assert!(cmd.validate().is_err());
    }
}
