//! Domain enums shared by the analysis crate and the server
//!
//! All of them serialize as lowercase strings, which is also how they are
//! stored in PostgreSQL `TEXT` columns.

use crate::error::NeurikaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Answer Categories
// ============================================================================

/// The kind of answer a question asks for.
///
/// Every assistant answer carries all three sections; the category only tells
/// the completion provider which one to emphasise.
///
/// # Examples
///
/// ```
/// use neurika_common::types::AnswerCategory;
///
/// let category: AnswerCategory = "interpretation".parse().unwrap();
/// assert_eq!(category, AnswerCategory::Interpretation);
/// assert_eq!(category.to_string(), "interpretation");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnswerCategory {
    /// What the data shows
    #[default]
    Observation,
    /// Why it might be so
    Interpretation,
    /// What to do about it
    Actionable,
}

impl AnswerCategory {
    pub const ALL: [AnswerCategory; 3] = [
        AnswerCategory::Observation,
        AnswerCategory::Interpretation,
        AnswerCategory::Actionable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerCategory::Observation => "observation",
            AnswerCategory::Interpretation => "interpretation",
            AnswerCategory::Actionable => "actionable",
        }
    }

    /// Heading used when the answer is rendered
    pub fn section_title(self) -> &'static str {
        match self {
            AnswerCategory::Observation => "Observation",
            AnswerCategory::Interpretation => "Interpretation",
            AnswerCategory::Actionable => "Actionable Conclusion",
        }
    }
}

impl fmt::Display for AnswerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerCategory {
    type Err = NeurikaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "observation" => Ok(AnswerCategory::Observation),
            "interpretation" => Ok(AnswerCategory::Interpretation),
            "actionable" | "actionable_conclusion" => Ok(AnswerCategory::Actionable),
            other => Err(NeurikaError::InvalidCategory(other.to_string())),
        }
    }
}

// ============================================================================
// Team Roles
// ============================================================================

/// Team role stored in `user_roles`.
///
/// Ordering follows privilege: `Reader < Editor < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Reader,
    Editor,
    Admin,
}

impl TeamRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TeamRole::Reader => "reader",
            TeamRole::Editor => "editor",
            TeamRole::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        self == TeamRole::Admin
    }

    /// Admins and editors may view the team roster
    pub fn can_view_team(self) -> bool {
        self >= TeamRole::Editor
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamRole {
    type Err = NeurikaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reader" => Ok(TeamRole::Reader),
            "editor" => Ok(TeamRole::Editor),
            "admin" => Ok(TeamRole::Admin),
            other => Err(NeurikaError::InvalidRole(other.to_string())),
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatRole {
    type Err = NeurikaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(NeurikaError::InvalidMessageRole(other.to_string())),
        }
    }
}

/// Where an assistant answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    /// A stored Q&A override matched; no completion call was made
    Predefined,
    /// Generated by the completion provider
    Model,
}

impl AnswerSource {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerSource::Predefined => "predefined",
            AnswerSource::Model => "model",
        }
    }
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerSource {
    type Err = NeurikaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "predefined" => Ok(AnswerSource::Predefined),
            "model" => Ok(AnswerSource::Model),
            other => Err(NeurikaError::Parse(format!("unknown answer source: {}", other))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_display() {
        for category in AnswerCategory::ALL {
            assert_eq!(category.to_string().parse::<AnswerCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_accepts_section_key() {
        assert_eq!(
            "Actionable_Conclusion".parse::<AnswerCategory>().unwrap(),
            AnswerCategory::Actionable
        );
        assert!("summary".parse::<AnswerCategory>().is_err());
    }

    #[test]
    fn test_category_serde_is_lowercase() {
        let json = serde_json::to_string(&AnswerCategory::Interpretation).unwrap();
        assert_eq!(json, "\"interpretation\"");
    }

    #[test]
    fn test_role_privilege_order() {
        assert!(TeamRole::Admin > TeamRole::Editor);
        assert!(TeamRole::Editor > TeamRole::Reader);
        assert!(TeamRole::Editor.can_view_team());
        assert!(!TeamRole::Reader.can_view_team());
        assert!(TeamRole::Admin.is_admin());
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert_eq!(" ADMIN ".parse::<TeamRole>().unwrap(), TeamRole::Admin);
        assert!(matches!(
            "owner".parse::<TeamRole>(),
            Err(NeurikaError::InvalidRole(_))
        ));
    }

    #[test]
    fn test_chat_role_parse() {
        assert_eq!("assistant".parse::<ChatRole>().unwrap(), ChatRole::Assistant);
        assert!("system".parse::<ChatRole>().is_err());
    }

    #[test]
    fn test_answer_source_parse() {
        assert_eq!("predefined".parse::<AnswerSource>().unwrap(), AnswerSource::Predefined);
        assert!(matches!("cache".parse::<AnswerSource>(), Err(NeurikaError::Parse(_))));
    }
}
