use chrono::{DateTime, Utc};
use neurika_analysis::ChartSpec;
use neurika_common::types::{AnswerCategory, AnswerSource, ChatRole};
use neurika_common::NeurikaError;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

pub const DEFAULT_SESSION_TITLE: &str = "New Analysis";

/// A row of `chat_sessions`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_id: Option<Uuid>,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const SESSION_COLUMNS: &str = "id, user_id, file_id, title, created_at, updated_at";

impl SessionRecord {
    pub async fn find_owned<'e, E>(
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM chat_sessions WHERE id = $1 AND user_id = $2",
            SESSION_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    pub async fn insert<'e, E>(
        executor: E,
        user_id: Uuid,
        file_id: Option<Uuid>,
        title: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO chat_sessions (user_id, file_id, title)
             VALUES ($1, $2, $3)
             RETURNING {}",
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .bind(file_id)
        .bind(title)
        .fetch_one(executor)
        .await
    }

    pub async fn touch<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("UPDATE chat_sessions SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}

/// Title for a new session: `Analysis: {file_name}`, cut to `max_chars`
pub fn default_title(file_name: Option<&str>, max_chars: usize) -> String {
    match file_name {
        Some(name) if !name.trim().is_empty() => format!("Analysis: {}", name.trim())
            .chars()
            .take(max_chars)
            .collect(),
        _ => DEFAULT_SESSION_TITLE.to_string(),
    }
}

/// A row of `chat_messages` with enum columns still as text
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: String,
    pub content: String,
    pub category: Option<String>,
    pub source: Option<String>,
    pub observation: Option<String>,
    pub interpretation: Option<String>,
    pub actionable_conclusion: Option<String>,
    pub chart: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

pub(crate) const MESSAGE_COLUMNS: &str = "id, session_id, role, content, category, source, \
     observation, interpretation, actionable_conclusion, chart, created_at";

/// Messages of a session in creation order
pub async fn fetch_messages<'e, E>(executor: E, session_id: Uuid) -> Result<Vec<ChatMessage>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, MessageRow>(&format!(
        "SELECT {} FROM chat_messages WHERE session_id = $1 ORDER BY created_at, id",
        MESSAGE_COLUMNS
    ))
    .bind(session_id)
    .fetch_all(executor)
    .await?;

    rows.into_iter()
        .map(|row| ChatMessage::try_from(row).map_err(|e| sqlx::Error::Decode(Box::new(e))))
        .collect()
}

/// A stored chat message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub category: Option<AnswerCategory>,
    pub source: Option<AnswerSource>,
    pub observation: Option<String>,
    pub interpretation: Option<String>,
    pub actionable_conclusion: Option<String>,
    pub chart: Option<ChartSpec>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = NeurikaError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            session_id: row.session_id,
            role: row.role.parse()?,
            content: row.content,
            category: row.category.as_deref().map(str::parse).transpose()?,
            source: row.source.as_deref().map(str::parse).transpose()?,
            observation: row.observation,
            interpretation: row.interpretation,
            actionable_conclusion: row.actionable_conclusion,
            // A chart that no longer matches the current shape is dropped
            chart: row.chart.and_then(|v| serde_json::from_value(v).ok()),
            created_at: row.created_at,
        })
    }
}

/// Values for one appended message
#[derive(Debug, Clone)]
pub struct NewMessage<'a> {
    pub session_id: Uuid,
    pub role: ChatRole,
    pub content: &'a str,
    pub category: Option<AnswerCategory>,
    pub source: Option<AnswerSource>,
    pub observation: Option<&'a str>,
    pub interpretation: Option<&'a str>,
    pub actionable_conclusion: Option<&'a str>,
    pub chart: Option<&'a ChartSpec>,
}

impl NewMessage<'_> {
    pub async fn insert<'e, E>(&self, executor: E) -> Result<MessageRow, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let chart = self
            .chart
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query_as::<_, MessageRow>(&format!(
            "INSERT INTO chat_messages
                (session_id, role, content, category, source, observation,
                 interpretation, actionable_conclusion, chart)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            MESSAGE_COLUMNS
        ))
        .bind(self.session_id)
        .bind(self.role.as_str())
        .bind(self.content)
        .bind(self.category.map(AnswerCategory::as_str))
        .bind(self.source.map(AnswerSource::as_str))
        .bind(self.observation)
        .bind(self.interpretation)
        .bind(self.actionable_conclusion)
        .bind(chart)
        .fetch_one(executor)
        .await
    }
}
