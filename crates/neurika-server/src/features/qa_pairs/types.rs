use chrono::{DateTime, Utc};
use neurika_analysis::{overrides::normalize_keywords, OverrideRule};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// A row of `qa_pairs`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QaPairRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question: String,
    pub keywords: Vec<String>,
    pub observation_content: Option<String>,
    pub interpretation_content: Option<String>,
    pub actionable_content: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const QA_PAIR_COLUMNS: &str = "id, user_id, question, keywords, observation_content, \
     interpretation_content, actionable_content, is_active, created_at, updated_at";

impl OverrideRule for QaPairRecord {
    fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl QaPairRecord {
    pub async fn find_owned<'e, E>(
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM qa_pairs WHERE id = $1 AND user_id = $2",
            QA_PAIR_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Active rules in match order: oldest first
    pub async fn active_rules<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM qa_pairs WHERE user_id = $1 AND is_active
             ORDER BY created_at, id",
            QA_PAIR_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(executor)
        .await
    }
}

/// Keywords as a JSON array or a single comma-separated string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordsInput {
    List(Vec<String>),
    Text(String),
}

impl KeywordsInput {
    /// Trimmed, lower-cased, de-duplicated, empty entries dropped
    pub fn normalized(&self) -> Vec<String> {
        match self {
            KeywordsInput::List(list) => normalize_keywords(list),
            KeywordsInput::Text(text) => normalize_keywords(text.split(',')),
        }
    }
}

/// Blank answer bodies are stored as NULL
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurika_analysis::find_override;

    fn record(keywords: &[&str], active: bool) -> QaPairRecord {
        QaPairRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            question: "q".into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            observation_content: Some("obs".into()),
            interpretation_content: None,
            actionable_content: None,
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_keywords_from_comma_string() {
        let input: KeywordsInput = serde_json::from_str("\" Revenue, sales ,, revenue\"").unwrap();
        assert_eq!(input.normalized(), vec!["revenue", "sales"]);
    }

    #[test]
    fn test_keywords_from_list() {
        let input: KeywordsInput = serde_json::from_str(r#"["Churn", " ", "churn rate"]"#).unwrap();
        assert_eq!(input.normalized(), vec!["churn", "churn rate"]);
    }

    #[test]
    fn test_record_acts_as_override_rule() {
        let rules = vec![record(&["profit"], false), record(&["revenue", "sales"], true)];
        let hit = find_override(&rules, "What were total sales?").unwrap();
        assert_eq!(hit.id, rules[1].id);
        assert!(find_override(&rules, "What was the profit?").is_none());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some("x".into())), Some("x".into()));
        assert_eq!(non_blank(None), None);
    }
}
