//! Turning a question into an answer
//!
//! A matching predefined answer is returned as stored and the completion
//! provider is not called. Otherwise the provider gets the system prompt,
//! optional dataset context, the recent history and the question, and is
//! asked for one JSON object. Replies that ignore the schema are still
//! accepted: the raw text becomes the answer and its first 300 characters
//! the observation.

use super::types::ChatMessage;
use crate::features::qa_pairs::QaPairRecord;
use crate::llm::{CompletionError, CompletionProvider, CompletionRequest, Message};
use neurika_analysis::{extract_chart, find_override, ChartSpec, DatasetProfile};
use neurika_common::types::{AnswerCategory, AnswerSource, ChatRole};
use serde::Deserialize;
use uuid::Uuid;

pub const SYSTEM_PROMPT: &str = "You are Neurika, an AI data analyst. \
Answer the user's question about their dataset and reply with a single JSON object \
with exactly these fields:
{
  \"answer\": \"The full answer in Markdown\",
  \"observation\": \"Clear, factual summary of what the data shows\",
  \"interpretation\": \"Deeper insights, patterns or relationships in the data\",
  \"actionable_conclusion\": \"Practical recommendations that follow from the data\",
  \"chart\": null
}
When a chart helps, set \"chart\" to {\"chartType\": \"bar\" | \"line\" | \"pie\", \"title\": \"...\", \
\"data\": [{\"name\": \"...\", \"value\": 0}], \"xLabel\": \"...\", \"yLabel\": \"...\"} \
or {\"chartType\": \"scatter\", \"title\": \"...\", \"data\": [{\"name\": \"...\", \"x\": 0, \"y\": 0}]}.
For totals and averages start the answer with **Total <metric>**: <value> or \
**Average <metric>**: <value>, then **Breakdown by <dimension>** with one \
\"- label: value (percent%)\" bullet per row, then **Key Insights** and **Recommendations** as bullet lists.
Use only figures that appear in the provided data. Keep each section concise.";

/// Past messages sent along with a question
pub const HISTORY_LIMIT: usize = 10;

pub const FALLBACK_OBSERVATION_CHARS: usize = 300;
pub const FALLBACK_INTERPRETATION: &str = "See observation for details";
pub const FALLBACK_ACTIONABLE: &str = "Please refine your question for more specific insights";

/// Dataset text and profile handed to the provider
#[derive(Debug, Clone)]
pub struct DatasetContext {
    pub file_name: String,
    pub excerpt: String,
    pub profile: Option<DatasetProfile>,
}

impl DatasetContext {
    pub fn new(file_name: impl Into<String>, text: &str, max_chars: usize, profile: Option<DatasetProfile>) -> Self {
        Self {
            file_name: file_name.into(),
            excerpt: truncate_chars(text, max_chars).to_string(),
            profile,
        }
    }

    fn render(&self) -> String {
        let mut out = format!("Dataset: {}\n", self.file_name);
        if let Some(profile) = &self.profile {
            out.push_str("\nProfile:\n");
            out.push_str(&profile.context_summary());
        }
        out.push_str(&format!(
            "\nData (first {} characters):\n{}",
            self.excerpt.chars().count(),
            self.excerpt
        ));
        out
    }
}

/// Longest prefix of `text` with at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_messages(
    history: &[ChatMessage],
    context: Option<&DatasetContext>,
    category: AnswerCategory,
    question: &str,
) -> Vec<Message> {
    let mut messages = vec![Message::system(SYSTEM_PROMPT)];

    if let Some(context) = context {
        messages.push(Message::system(context.render()));
    }

    let skip = history.len().saturating_sub(HISTORY_LIMIT);
    messages.extend(history.iter().skip(skip).map(|m| match m.role {
        ChatRole::User => Message::user(m.content.as_str()),
        ChatRole::Assistant => Message::assistant(m.content.as_str()),
    }));

    messages.push(Message::user(format!(
        "Answer category: {}. Put the emphasis on the {} section.\n\nQuestion: {}",
        category,
        category.section_title(),
        question
    )));

    messages
}

#[derive(Debug, Deserialize)]
struct ModelReply {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    observation: Option<String>,
    #[serde(default)]
    interpretation: Option<String>,
    #[serde(default)]
    actionable_conclusion: Option<String>,
    #[serde(default)]
    chart: Option<serde_json::Value>,
}

/// Provider reply split into the stored fields
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnswer {
    pub content: String,
    pub observation: String,
    pub interpretation: String,
    pub actionable_conclusion: String,
    pub chart: Option<ChartSpec>,
}

pub fn parse_answer(raw: &str) -> ParsedAnswer {
    let reply = serde_json::from_str::<ModelReply>(raw.trim());

    let Ok(reply) = reply else {
        tracing::debug!("Completion was not JSON, using fallback sections");
        return ParsedAnswer {
            content: raw.to_string(),
            observation: truncate_chars(raw, FALLBACK_OBSERVATION_CHARS).to_string(),
            interpretation: FALLBACK_INTERPRETATION.to_string(),
            actionable_conclusion: FALLBACK_ACTIONABLE.to_string(),
            chart: extract_chart(raw),
        };
    };

    let observation = reply.observation.unwrap_or_default();
    let interpretation = reply.interpretation.unwrap_or_default();
    let actionable_conclusion = reply.actionable_conclusion.unwrap_or_default();

    let chart = reply
        .chart
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value::<ChartSpec>(v).ok())
        .filter(|c| !c.is_empty());

    let content = match reply.answer.filter(|a| !a.trim().is_empty()) {
        Some(answer) => answer,
        None => compose_sections(
            Some(observation.as_str()),
            Some(interpretation.as_str()),
            Some(actionable_conclusion.as_str()),
        ),
    };

    ParsedAnswer {
        content,
        observation,
        interpretation,
        actionable_conclusion,
        chart,
    }
}

/// Markdown with one bold heading per non-empty section
pub fn compose_sections(
    observation: Option<&str>,
    interpretation: Option<&str>,
    actionable: Option<&str>,
) -> String {
    [
        (AnswerCategory::Observation, observation),
        (AnswerCategory::Interpretation, interpretation),
        (AnswerCategory::Actionable, actionable),
    ]
    .into_iter()
    .filter_map(|(category, body)| {
        body.map(str::trim)
            .filter(|b| !b.is_empty())
            .map(|b| format!("**{}**\n{}", category.section_title(), b))
    })
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// An assistant answer ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub source: AnswerSource,
    pub content: String,
    pub observation: Option<String>,
    pub interpretation: Option<String>,
    pub actionable_conclusion: Option<String>,
    pub chart: Option<ChartSpec>,
    /// The predefined answer that was used
    pub qa_pair_id: Option<Uuid>,
}

impl Answer {
    pub fn predefined(rule: &QaPairRecord) -> Self {
        let content = compose_sections(
            rule.observation_content.as_deref(),
            rule.interpretation_content.as_deref(),
            rule.actionable_content.as_deref(),
        );

        Self {
            source: AnswerSource::Predefined,
            content,
            observation: rule.observation_content.clone(),
            interpretation: rule.interpretation_content.clone(),
            actionable_conclusion: rule.actionable_content.clone(),
            chart: None,
            qa_pair_id: Some(rule.id),
        }
    }

    fn from_model(parsed: ParsedAnswer) -> Self {
        let non_empty = |s: String| (!s.trim().is_empty()).then_some(s);
        Self {
            source: AnswerSource::Model,
            content: parsed.content,
            observation: non_empty(parsed.observation),
            interpretation: non_empty(parsed.interpretation),
            actionable_conclusion: non_empty(parsed.actionable_conclusion),
            chart: parsed.chart,
            qa_pair_id: None,
        }
    }
}

/// Answer from the first matching rule, or from the provider.
///
/// `messages` is only evaluated when no rule matches.
pub async fn answer_question<F>(
    provider: &dyn CompletionProvider,
    rules: &[QaPairRecord],
    question: &str,
    messages: F,
) -> Result<Answer, CompletionError>
where
    F: FnOnce() -> Vec<Message>,
{
    if let Some(rule) = find_override(rules, question) {
        tracing::info!(qa_pair_id = %rule.id, "Answered from predefined Q&A pair");
        return Ok(Answer::predefined(rule));
    }

    let raw = provider
        .complete(CompletionRequest {
            messages: messages(),
            json_mode: true,
        })
        .await?;

    Ok(Answer::from_model(parse_answer(&raw)))
}
