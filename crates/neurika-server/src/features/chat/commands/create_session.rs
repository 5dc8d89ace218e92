//! Create an analysis session
//!
//! Without a title the session is named after its dataset.

use super::super::types::{default_title, SessionRecord};
use crate::features::datasets::DatasetRecord;
use crate::features::shared::error_helpers::map_foreign_key_violation;
use crate::features::shared::validation::{validate_text, TextValidationError, TITLE_MAX_CHARS};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(default)]
    pub file_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateSessionError {
    #[error(transparent)]
    Invalid(#[from] TextValidationError),
    #[error("Dataset '{0}' not found")]
    DatasetNotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<SessionRecord, CreateSessionError>> for CreateSessionCommand {}

impl crate::cqrs::middleware::Command for CreateSessionCommand {}

impl CreateSessionCommand {
    pub fn validate(&self) -> Result<(), CreateSessionError> {
        if let Some(title) = &self.title {
            validate_text("title", title, TITLE_MAX_CHARS)?;
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: CreateSessionCommand,
) -> Result<SessionRecord, CreateSessionError> {
    command.validate()?;

    let dataset = match command.file_id {
        Some(file_id) => Some(
            DatasetRecord::find_owned(&pool, command.user_id, file_id)
                .await?
                .ok_or(CreateSessionError::DatasetNotFound(file_id))?,
        ),
        None => None,
    };

    let title = match command.title {
        Some(title) => title.trim().to_string(),
        None => default_title(dataset.as_ref().map(|d| d.file_name.as_str()), TITLE_MAX_CHARS),
    };

    let file_id = dataset.map(|d| d.id);
    // The dataset can be deleted between the ownership check and the insert
    let session = SessionRecord::insert(&pool, command.user_id, file_id, &title)
        .await
        .map_err(|e| match file_id {
            Some(id) => map_foreign_key_violation(
                e,
                CreateSessionError::DatasetNotFound(id),
                CreateSessionError::Database,
            ),
            None => CreateSessionError::Database(e),
        })?;

    tracing::info!(session_id = %session.id, "Chat session created");

    Ok(session)
}
