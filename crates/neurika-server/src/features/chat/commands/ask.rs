//! Ask a question in a session
//!
//! Steps, in order:
//! 1. validate the question
//! 2. resolve the session, or create one for the dataset
//! 3. pick the category from the hint or the keyword router
//! 4. store the user message
//! 5. answer from a predefined Q&A pair or from the completion provider
//! 6. store the assistant message and bump the session
//!
//! The dataset profile is returned on the first turn of a session only.

use super::super::pipeline::{answer_question, build_messages, DatasetContext};
use super::super::types::{default_title, fetch_messages, ChatMessage, NewMessage, SessionRecord};
use crate::features::datasets::DatasetRecord;
use crate::features::qa_pairs::QaPairRecord;
use crate::features::shared::validation::{validate_text, TextValidationError, QUESTION_MAX_CHARS, TITLE_MAX_CHARS};
use crate::features::FeatureSettings;
use crate::llm::{CompletionError, CompletionProvider};
use crate::storage::Storage;
use mediator::Request;
use neurika_analysis::{classify_with_reason, DatasetOverview, DatasetProfile, FormattedResponse, ParseOptions, ResponseFormatter};
use neurika_common::types::{AnswerCategory, AnswerSource, ChatRole};
use neurika_common::NeurikaError;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskQuestionCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    pub question: String,
    #[serde(default)]
    pub file_id: Option<Uuid>,
    #[serde(default)]
    pub session_id: Option<Uuid>,
    /// Overrides the keyword router
    #[serde(default)]
    pub category: Option<AnswerCategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskQuestionResponse {
    pub session_id: Uuid,
    pub category: AnswerCategory,
    pub source: AnswerSource,
    pub message: ChatMessage,
    pub formatted: FormattedResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qa_pair_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_profile: Option<DatasetProfile>,
}

#[derive(Debug, thiserror::Error)]
pub enum AskQuestionError {
    #[error(transparent)]
    Invalid(#[from] TextValidationError),
    #[error("Session '{0}' not found")]
    SessionNotFound(Uuid),
    #[error("Dataset '{0}' not found")]
    DatasetNotFound(Uuid),
    #[error("Completion provider error: {0}")]
    Completion(#[from] CompletionError),
    #[error("Stored message is invalid: {0}")]
    Corrupt(#[from] NeurikaError),
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<AskQuestionResponse, AskQuestionError>> for AskQuestionCommand {}

impl crate::cqrs::middleware::Command for AskQuestionCommand {}

impl AskQuestionCommand {
    pub fn validate(&self) -> Result<(), AskQuestionError> {
        validate_text("question", &self.question, QUESTION_MAX_CHARS)?;
        Ok(())
    }
}

/// Clients shared by every question
#[derive(Clone, Copy)]
pub struct AskDeps<'a> {
    pub storage: &'a Storage,
    pub provider: &'a dyn CompletionProvider,
    pub formatter: &'a ResponseFormatter,
    pub settings: FeatureSettings,
}

#[tracing::instrument(skip(pool, deps, command), fields(user_id = %command.user_id, session_id = tracing::field::Empty))]
pub async fn handle(
    pool: PgPool,
    deps: AskDeps<'_>,
    command: AskQuestionCommand,
) -> Result<AskQuestionResponse, AskQuestionError> {
    command.validate()?;
    let question = command.question.trim();

    let session = resolve_session(&pool, &command).await?;
    tracing::Span::current().record("session_id", tracing::field::display(session.id));

    let history = fetch_messages(&pool, session.id).await?;
    let first_turn = history.is_empty();

    let category = match command.category {
        Some(category) => category,
        None => {
            let routing = classify_with_reason(question);
            tracing::debug!(category = %routing.category, keyword = ?routing.keyword, "Question routed");
            routing.category
        },
    };

    NewMessage {
        session_id: session.id,
        role: ChatRole::User,
        content: question,
        category: Some(category),
        source: None,
        observation: None,
        interpretation: None,
        actionable_conclusion: None,
        chart: None,
    }
    .insert(&pool)
    .await?;

    let rules = QaPairRecord::active_rules(&pool, command.user_id).await?;
    let overridden = neurika_analysis::find_override(&rules, question).is_some();

    // Context is needed for the model, and for the profile on the first turn
    let file_id = session.file_id.or(command.file_id);
    let context = match file_id {
        Some(file_id) if first_turn || !overridden => {
            load_context(&pool, deps, command.user_id, file_id).await?
        },
        _ => None,
    };

    let answer = answer_question(deps.provider, &rules, question, || {
        build_messages(&history, context.as_ref(), category, question)
    })
    .await?;

    let row = NewMessage {
        session_id: session.id,
        role: ChatRole::Assistant,
        content: &answer.content,
        category: Some(category),
        source: Some(answer.source),
        observation: answer.observation.as_deref(),
        interpretation: answer.interpretation.as_deref(),
        actionable_conclusion: answer.actionable_conclusion.as_deref(),
        chart: answer.chart.as_ref(),
    }
    .insert(&pool)
    .await?;

    SessionRecord::touch(&pool, session.id).await?;

    let message = ChatMessage::try_from(row)?;
    let formatted = deps.formatter.format_response(&message.content);

    tracing::info!(
        category = %category,
        source = %answer.source,
        first_turn,
        "Question answered"
    );

    Ok(AskQuestionResponse {
        session_id: session.id,
        category,
        source: answer.source,
        message,
        formatted,
        qa_pair_id: answer.qa_pair_id,
        dataset_profile: if first_turn {
            context.and_then(|c| c.profile)
        } else {
            None
        },
    })
}

async fn resolve_session(
    pool: &PgPool,
    command: &AskQuestionCommand,
) -> Result<SessionRecord, AskQuestionError> {
    if let Some(session_id) = command.session_id {
        return SessionRecord::find_owned(pool, command.user_id, session_id)
            .await?
            .ok_or(AskQuestionError::SessionNotFound(session_id));
    }

    let dataset = match command.file_id {
        Some(file_id) => Some(
            DatasetRecord::find_owned(pool, command.user_id, file_id)
                .await?
                .ok_or(AskQuestionError::DatasetNotFound(file_id))?,
        ),
        None => None,
    };

    let title = default_title(dataset.as_ref().map(|d| d.file_name.as_str()), TITLE_MAX_CHARS);
    let session = SessionRecord::insert(pool, command.user_id, dataset.map(|d| d.id), &title).await?;

    tracing::info!(session_id = %session.id, "Chat session created for question");

    Ok(session)
}

/// Dataset excerpt and profile, or `None` for files that cannot be read as CSV
async fn load_context(
    pool: &PgPool,
    deps: AskDeps<'_>,
    user_id: Uuid,
    file_id: Uuid,
) -> Result<Option<DatasetContext>, AskQuestionError> {
    let Some(dataset) = DatasetRecord::find_owned(pool, user_id, file_id).await? else {
        tracing::debug!(%file_id, "Session dataset no longer exists");
        return Ok(None);
    };

    if !dataset.format().is_some_and(|f| f.is_tabular_text()) {
        tracing::debug!(file_name = %dataset.file_name, "Dataset is not CSV, no context sent");
        return Ok(None);
    }

    let text = deps.storage.download_text(&dataset.file_path).await?;

    let profile = match neurika_analysis::overview(&text, &ParseOptions::default()) {
        Ok(DatasetOverview::Ready(profile)) => Some(profile),
        Ok(DatasetOverview::NoData) => None,
        Err(e) => {
            tracing::warn!(error = %e, file_name = %dataset.file_name, "Dataset could not be profiled");
            None
        },
    };

    Ok(Some(DatasetContext::new(
        dataset.file_name,
        &text,
        deps.settings.dataset_context_chars,
        profile,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_question() {
        let mut cmd = AskQuestionCommand {
            question: "What were total sales?".into(),
            ..Default::default()
        };
        assert!(cmd.validate().is_ok());

        cmd.question = "  ".into();
        assert!(matches!(cmd.validate(), Err(AskQuestionError::Invalid(_))));

        cmd.question = "x".repeat(QUESTION_MAX_CHARS + 1);
        assert!(matches!(cmd.validate(), Err(AskQuestionError::Invalid(_))));
    }

    #[test]
    fn test_category_hint_deserializes() {
        let cmd: AskQuestionCommand = serde_json::from_value(serde_json::json!({
            "question": "Why?",
            "category": "actionable",
            "user_id": Uuid::new_v4(),
        }))
        .unwrap();
        assert_eq!(cmd.category, Some(AnswerCategory::Actionable));
        assert_eq!(cmd.user_id, Uuid::nil());
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::features::shared::test_helpers::{TestQaPair, TestSession};
    use crate::llm::CompletionRequest;
    use crate::storage::config::StorageConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProvider {
        reply: &'static str,
        calls: AtomicUsize,
        last_len: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_len: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_len.store(request.messages.len(), Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    async fn ask(
        pool: &PgPool,
        provider: &ScriptedProvider,
        command: AskQuestionCommand,
    ) -> Result<AskQuestionResponse, AskQuestionError> {
        // Never contacted: these questions carry no dataset
        let storage = Storage::new(StorageConfig::for_minio("http://127.0.0.1:1", "datasets"))
            .await
            .unwrap();
        let formatter = ResponseFormatter::new().unwrap();
        let deps = AskDeps {
            storage: &storage,
            provider,
            formatter: &formatter,
            settings: FeatureSettings {
                upload_max_bytes: 1024,
                dataset_context_chars: 1000,
            },
        };
        handle(pool.clone(), deps, command).await
    }

    // Requires DATABASE_URL pointing at a disposable PostgreSQL server
    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_predefined_answer_skips_provider(pool: PgPool) -> sqlx::Result<()> {
        let user_id = Uuid::new_v4();
        let pair = TestQaPair::new(user_id, &["total sales"])
            .with_observation("Sales reached $1.2M")
            .insert(&pool)
            .await?;
        let provider = ScriptedProvider::new("unused");

        let response = ask(
            &pool,
            &provider,
            AskQuestionCommand {
                user_id,
                question: "What were the Total Sales?".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(response.source, AnswerSource::Predefined);
        assert_eq!(response.qa_pair_id, Some(pair.id));
        assert_eq!(response.message.observation.as_deref(), Some("Sales reached $1.2M"));
        assert!(response.dataset_profile.is_none());

        let stored = fetch_messages(&pool, response.session_id).await?;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].role, ChatRole::User);
        assert_eq!(stored[1].role, ChatRole::Assistant);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_model_answer_carries_history(pool: PgPool) -> sqlx::Result<()> {
        let user_id = Uuid::new_v4();
        let session = TestSession::new(user_id).insert(&pool).await?;
        let provider = ScriptedProvider::new(
            r#"{"answer":"Revenue grew","observation":"Up 12%","interpretation":"Seasonal","actionable_conclusion":"Stock up"}"#,
        );

        for question in ["Why did revenue grow?", "What should we do next?"] {
            let response = ask(
                &pool,
                &provider,
                AskQuestionCommand {
                    user_id,
                    question: question.into(),
                    session_id: Some(session.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            assert_eq!(response.session_id, session.id);
            assert_eq!(response.source, AnswerSource::Model);
            assert_eq!(response.message.content, "Revenue grew");
        }

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        // System prompt, the first exchange and the new question
        assert_eq!(provider.last_len.load(Ordering::SeqCst), 4);
        assert_eq!(fetch_messages(&pool, session.id).await?.len(), 4);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_foreign_session_is_not_found(pool: PgPool) -> sqlx::Result<()> {
        let session = TestSession::new(Uuid::new_v4()).insert(&pool).await?;
        let provider = ScriptedProvider::new("{}");

        let result = ask(
            &pool,
            &provider,
            AskQuestionCommand {
                user_id: Uuid::new_v4(),
                question: "Anything?".into(),
                session_id: Some(session.id),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AskQuestionError::SessionNotFound(_))));
        Ok(())
    }
}
