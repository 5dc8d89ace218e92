//! Invite someone to the team (admins only)
//!
//! The invitation is stored first; the e-mail is best effort and a delivery
//! failure is logged, not returned.

use super::super::types::{
    InvitationRow, TeamInvitation, INVITATION_COLUMNS, INVITATION_TTL_DAYS,
};
use crate::features::shared::error_helpers::map_unique_violation;
use crate::features::shared::roles::fetch_role;
use crate::features::shared::validation::{
    validate_email, validate_optional_text, EmailValidationError, TextValidationError,
    INVITE_MESSAGE_MAX_CHARS,
};
use crate::mail::{Invitation, Mailer};
use chrono::{Duration, Utc};
use mediator::Request;
use neurika_common::types::TeamRole;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteMemberCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    pub email: String,
    pub role: TeamRole,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteMemberResponse {
    pub invitation: TeamInvitation,
    /// Returned to the inviting admin so the link can be shared by hand
    pub token: Uuid,
    pub email_sent: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InviteMemberError {
    #[error(transparent)]
    InvalidEmail(#[from] EmailValidationError),
    #[error(transparent)]
    Invalid(#[from] TextValidationError),
    #[error("Only admins can invite team members")]
    Forbidden,
    #[error("'{0}' is already a team member")]
    AlreadyMember(String),
    #[error("'{0}' already has a pending invitation")]
    AlreadyInvited(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<InviteMemberResponse, InviteMemberError>> for InviteMemberCommand {}

impl crate::cqrs::middleware::Command for InviteMemberCommand {}

impl InviteMemberCommand {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn validate(&self) -> Result<(), InviteMemberError> {
        validate_email(&self.normalized_email())?;
        validate_optional_text("message", self.message.as_deref(), INVITE_MESSAGE_MAX_CHARS)?;
        Ok(())
    }
}

#[tracing::instrument(skip(pool, mailer, command), fields(user_id = %command.user_id, role = %command.role))]
pub async fn handle(
    pool: PgPool,
    mailer: Option<&Mailer>,
    command: InviteMemberCommand,
) -> Result<InviteMemberResponse, InviteMemberError> {
    command.validate()?;
    let email = command.normalized_email();
    let message = command
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    if !fetch_role(&pool, command.user_id)
        .await?
        .is_some_and(TeamRole::is_admin)
    {
        return Err(InviteMemberError::Forbidden);
    }

    let is_member: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_roles WHERE lower(email) = $1)")
            .bind(&email)
            .fetch_one(&pool)
            .await?;
    if is_member {
        return Err(InviteMemberError::AlreadyMember(email));
    }

    let mut tx = pool.begin().await?;

    // An expired pending invitation must not block a fresh one
    sqlx::query(
        "UPDATE team_invitations SET status = 'revoked'
         WHERE lower(email) = $1 AND status = 'pending' AND expires_at <= NOW()",
    )
    .bind(&email)
    .execute(&mut *tx)
    .await?;

    let token = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::days(INVITATION_TTL_DAYS);

    let row = sqlx::query_as::<_, InvitationRow>(&format!(
        "INSERT INTO team_invitations (email, role, message, token, invited_by, expires_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        INVITATION_COLUMNS
    ))
    .bind(&email)
    .bind(command.role.as_str())
    .bind(message)
    .bind(token)
    .bind(command.user_id)
    .bind(expires_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        map_unique_violation(
            e,
            InviteMemberError::AlreadyInvited(email.clone()),
            InviteMemberError::Database,
        )
    })?;

    tx.commit().await?;

    let invitation = TeamInvitation::try_from(row)?;

    tracing::info!(invitation_id = %invitation.id, "Team invitation created");

    let email_sent = match mailer {
        Some(mailer) => {
            let outcome = mailer
                .send_invitation(&Invitation {
                    email: &invitation.email,
                    role: invitation.role,
                    token,
                    message,
                })
                .await;
            match outcome {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "Invitation e-mail could not be sent");
                    false
                },
            }
        },
        None => {
            tracing::debug!("Mail is not configured, invitation e-mail skipped");
            false
        },
    };

    Ok(InviteMemberResponse {
        invitation,
        token,
        email_sent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(email: &str) -> InviteMemberCommand {
        InviteMemberCommand {
            user_id: Uuid::nil(),
            email: email.into(),
            role: TeamRole::Editor,
            message: None,
        }
    }

    #[test]
    fn test_email_normalized() {
        let cmd = command("  Ana@Example.COM ");
        assert!(cmd.validate().is_ok());
        assert_eq!(cmd.normalized_email(), "ana@example.com");
    }

    #[test]
    fn test_invalid_email() {
        assert!(matches!(
            command("not-an-email").validate(),
            Err(InviteMemberError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_message_length() {
        let mut cmd = command("ana@example.com");
        cmd.message = Some("m".repeat(INVITE_MESSAGE_MAX_CHARS + 1));
        assert!(matches!(cmd.validate(), Err(InviteMemberError::Invalid(_))));
    }

    #[test]
    fn test_role_deserializes_lowercase() {
        let cmd: InviteMemberCommand = serde_json::from_value(serde_json::json!({
            "email": "ana@example.com",
            "role": "reader",
        }))
        .unwrap();
        assert_eq!(cmd.role, TeamRole::Reader);
        assert!(cmd.message.is_none());
    }
}
