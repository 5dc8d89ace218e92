//! Create a predefined answer

use super::super::types::{non_blank, KeywordsInput, QaPairRecord, QA_PAIR_COLUMNS};
use crate::features::shared::validation::{
    validate_optional_text, TextValidationError, ANSWER_MAX_CHARS, QUESTION_MAX_CHARS,
};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQaPairCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    pub question: String,
    pub keywords: KeywordsInput,
    #[serde(default)]
    pub observation_content: Option<String>,
    #[serde(default)]
    pub interpretation_content: Option<String>,
    #[serde(default)]
    pub actionable_content: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum CreateQaPairError {
    #[error("Question and at least one keyword are required")]
    Incomplete,
    #[error(transparent)]
    Invalid(#[from] TextValidationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<QaPairRecord, CreateQaPairError>> for CreateQaPairCommand {}

impl crate::cqrs::middleware::Command for CreateQaPairCommand {}

impl CreateQaPairCommand {
    /// Normalized keywords on success
    pub fn validate(&self) -> Result<Vec<String>, CreateQaPairError> {
        let keywords = self.keywords.normalized();
        if self.question.trim().is_empty() || keywords.is_empty() {
            return Err(CreateQaPairError::Incomplete);
        }
        validate_optional_text("question", Some(&self.question), QUESTION_MAX_CHARS)?;
        validate_answer_bodies(
            self.observation_content.as_deref(),
            self.interpretation_content.as_deref(),
            self.actionable_content.as_deref(),
        )?;
        Ok(keywords)
    }
}

pub(crate) fn validate_answer_bodies(
    observation: Option<&str>,
    interpretation: Option<&str>,
    actionable: Option<&str>,
) -> Result<(), TextValidationError> {
    validate_optional_text("observation_content", observation, ANSWER_MAX_CHARS)?;
    validate_optional_text("interpretation_content", interpretation, ANSWER_MAX_CHARS)?;
    validate_optional_text("actionable_content", actionable, ANSWER_MAX_CHARS)
}

#[tracing::instrument(skip(pool, command), fields(user_id = %command.user_id))]
pub async fn handle(
    pool: PgPool,
    command: CreateQaPairCommand,
) -> Result<QaPairRecord, CreateQaPairError> {
    let keywords = command.validate()?;

    let record = sqlx::query_as::<_, QaPairRecord>(&format!(
        "INSERT INTO qa_pairs
            (user_id, question, keywords, observation_content, interpretation_content,
             actionable_content, is_active)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {}",
        QA_PAIR_COLUMNS
    ))
    .bind(command.user_id)
    .bind(command.question.trim())
    .bind(&keywords)
    .bind(non_blank(command.observation_content))
    .bind(non_blank(command.interpretation_content))
    .bind(non_blank(command.actionable_content))
    .bind(command.is_active)
    .fetch_one(&pool)
    .await?;

    tracing::info!(qa_pair_id = %record.id, keywords = record.keywords.len(), "Q&A pair created");

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(question: &str, keywords: &str) -> CreateQaPairCommand {
        serde_json::from_value(serde_json::json!({
            "question": question,
            "keywords": keywords,
            "observation_content": "Revenue is up 12%",
        }))
        .unwrap()
    }

    #[test]
    fn test_validate_success() {
        let cmd = command("What were total sales?", "Sales, revenue");
        assert!(cmd.is_active);
        assert_eq!(cmd.validate().unwrap(), vec!["sales", "revenue"]);
    }

    #[test]
    fn test_validate_requires_keyword() {
        let cmd = command("What were total sales?", " , ");
        assert!(matches!(cmd.validate(), Err(CreateQaPairError::Incomplete)));
    }

    #[test]
    fn test_validate_requires_question() {
        let cmd = command("   ", "sales");
        let err = cmd.validate().unwrap_err();
        assert_eq!(err.to_string(), "Question and at least one keyword are required");
    }

    #[test]
    fn test_validate_answer_length() {
        let mut cmd = command("q", "k");
        cmd.actionable_content = Some("x".repeat(ANSWER_MAX_CHARS + 1));
        assert!(matches!(cmd.validate(), Err(CreateQaPairError::Invalid(_))));
    }
}
