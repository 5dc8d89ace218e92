//! Preview which predefined answer a question would get

use super::super::types::QaPairRecord;
use crate::features::shared::validation::{validate_text, TextValidationError, QUESTION_MAX_CHARS};
use mediator::Request;
use neurika_analysis::find_override;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchQaPairQuery {
    #[serde(skip)]
    pub user_id: Uuid,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchQaPairResponse {
    pub matched: bool,
    pub qa_pair: Option<QaPairRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum MatchQaPairError {
    #[error(transparent)]
    Invalid(#[from] TextValidationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<MatchQaPairResponse, MatchQaPairError>> for MatchQaPairQuery {}

impl crate::cqrs::middleware::Query for MatchQaPairQuery {}

impl MatchQaPairQuery {
    pub fn validate(&self) -> Result<(), MatchQaPairError> {
        validate_text("question", &self.question, QUESTION_MAX_CHARS)?;
        Ok(())
    }
}

#[tracing::instrument(skip(pool, query), fields(user_id = %query.user_id))]
pub async fn handle(
    pool: PgPool,
    query: MatchQaPairQuery,
) -> Result<MatchQaPairResponse, MatchQaPairError> {
    query.validate()?;

    let rules = QaPairRecord::active_rules(&pool, query.user_id).await?;
    let qa_pair = find_override(&rules, &query.question).cloned();

    Ok(MatchQaPairResponse {
        matched: qa_pair.is_some(),
        qa_pair,
    })
}
