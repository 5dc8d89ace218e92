//! Input validation shared by command and query `validate()` methods

use thiserror::Error;

pub const QUESTION_MAX_CHARS: usize = 4000;
pub const TITLE_MAX_CHARS: usize = 200;
pub const ANSWER_MAX_CHARS: usize = 20_000;
pub const INVITE_MESSAGE_MAX_CHARS: usize = 1000;
pub const EMAIL_MAX_CHARS: usize = 320;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be at most {max_chars} characters")]
    TooLong { field: &'static str, max_chars: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid e-mail address: {0}")]
pub struct EmailValidationError(pub String);

/// Non-blank and at most `max_chars` characters (not bytes)
pub fn validate_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), TextValidationError> {
    if value.trim().is_empty() {
        return Err(TextValidationError::Required { field });
    }
    if value.chars().count() > max_chars {
        return Err(TextValidationError::TooLong { field, max_chars });
    }
    Ok(())
}

/// Like [`validate_text`] but `None` is accepted
pub fn validate_optional_text(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<(), TextValidationError> {
    match value {
        Some(v) if v.chars().count() > max_chars => {
            Err(TextValidationError::TooLong { field, max_chars })
        },
        _ => Ok(()),
    }
}

/// Shape check only: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> Result<(), EmailValidationError> {
    let invalid = || EmailValidationError(email.to_string());

    if email.len() > EMAIL_MAX_CHARS || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}
