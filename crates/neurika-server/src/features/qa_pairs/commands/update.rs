//! Partial update of a predefined answer
//!
//! Absent fields are left unchanged. Answer bodies set to an empty string
//! are cleared.

use super::super::types::{non_blank, KeywordsInput, QaPairRecord, QA_PAIR_COLUMNS};
use super::create::validate_answer_bodies;
use crate::features::shared::validation::{validate_text, TextValidationError, QUESTION_MAX_CHARS};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateQaPairCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(skip)]
    pub id: Uuid,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub keywords: Option<KeywordsInput>,
    #[serde(default)]
    pub observation_content: Option<String>,
    #[serde(default)]
    pub interpretation_content: Option<String>,
    #[serde(default)]
    pub actionable_content: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateQaPairError {
    #[error("Q&A pair '{0}' not found")]
    NotFound(Uuid),
    #[error("At least one keyword is required")]
    NoKeywords,
    #[error(transparent)]
    Invalid(#[from] TextValidationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<QaPairRecord, UpdateQaPairError>> for UpdateQaPairCommand {}

impl crate::cqrs::middleware::Command for UpdateQaPairCommand {}

impl UpdateQaPairCommand {
    /// Normalized keywords when the update replaces them
    pub fn validate(&self) -> Result<Option<Vec<String>>, UpdateQaPairError> {
        if let Some(question) = &self.question {
            validate_text("question", question, QUESTION_MAX_CHARS)?;
        }
        validate_answer_bodies(
            self.observation_content.as_deref(),
            self.interpretation_content.as_deref(),
            self.actionable_content.as_deref(),
        )?;

        match &self.keywords {
            None => Ok(None),
            Some(input) => {
                let keywords = input.normalized();
                if keywords.is_empty() {
                    return Err(UpdateQaPairError::NoKeywords);
                }
                Ok(Some(keywords))
            },
        }
    }
}

// An answer body in the payload replaces the stored one; `Some("")` clears it.
fn merge_body(update: Option<String>, current: Option<String>) -> Option<String> {
    match update {
        Some(value) => non_blank(Some(value)),
        None => current,
    }
}

#[tracing::instrument(skip(pool, command), fields(user_id = %command.user_id, qa_pair_id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateQaPairCommand,
) -> Result<QaPairRecord, UpdateQaPairError> {
    let keywords = command.validate()?;

    let current = QaPairRecord::find_owned(&pool, command.user_id, command.id)
        .await?
        .ok_or(UpdateQaPairError::NotFound(command.id))?;

    let question = command
        .question
        .map(|q| q.trim().to_string())
        .unwrap_or(current.question);
    let keywords = keywords.unwrap_or(current.keywords);
    let observation = merge_body(command.observation_content, current.observation_content);
    let interpretation = merge_body(command.interpretation_content, current.interpretation_content);
    let actionable = merge_body(command.actionable_content, current.actionable_content);
    let is_active = command.is_active.unwrap_or(current.is_active);

    let record = sqlx::query_as::<_, QaPairRecord>(&format!(
        "UPDATE qa_pairs
         SET question = $3, keywords = $4, observation_content = $5,
             interpretation_content = $6, actionable_content = $7,
             is_active = $8, updated_at = NOW()
         WHERE id = $1 AND user_id = $2
         RETURNING {}",
        QA_PAIR_COLUMNS
    ))
    .bind(command.id)
    .bind(command.user_id)
    .bind(question)
    .bind(&keywords)
    .bind(observation)
    .bind(interpretation)
    .bind(actionable)
    .bind(is_active)
    .fetch_optional(&pool)
    .await?
    .ok_or(UpdateQaPairError::NotFound(command.id))?;

    tracing::info!(is_active = record.is_active, "Q&A pair updated");

    Ok(record)
}
