//! Keyword routing of questions to an answer category
//!
//! The table is ordered: the first rule with a matching keyword wins, and a
//! question matching no rule is an observation. Keywords are matched as
//! lower-case substrings, so avoid short words that occur inside others.

use neurika_common::types::AnswerCategory;
use serde::Serialize;

pub const ROUTING_RULES: &[(AnswerCategory, &[&str])] = &[
    (
        AnswerCategory::Actionable,
        &[
            "should",
            "recommend",
            "improve",
            "increase",
            "decrease",
            "reduce",
            "optimize",
            "optimise",
            "how can",
            "what can",
            "strategy",
            "suggest",
            "next step",
            "boost",
            "grow",
            "actionable",
        ],
    ),
    (
        AnswerCategory::Interpretation,
        &[
            "why",
            "correlat",
            "relationship",
            "cause",
            "explain",
            "pattern",
            "trend",
            "impact",
            "affect",
            "driver",
            "insight",
            "compare",
        ],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Routing {
    pub category: AnswerCategory,
    /// Keyword that decided the category; `None` for the default
    pub keyword: Option<&'static str>,
}

pub fn classify(question: &str) -> AnswerCategory {
    classify_with_reason(question).category
}

pub fn classify_with_reason(question: &str) -> Routing {
    let lowered = question.to_lowercase();

    for (category, keywords) in ROUTING_RULES {
        if let Some(keyword) = keywords.iter().copied().find(|k| lowered.contains(k)) {
            return Routing {
                category: *category,
                keyword: Some(keyword),
            };
        }
    }

    Routing {
        category: AnswerCategory::Observation,
        keyword: None,
    }
}
