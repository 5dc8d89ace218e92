//! Accept an invitation by token
//!
//! The caller's verified e-mail must match the invited address. A caller who
//! is already a member keeps the higher of their current and invited role.

use super::super::types::{
    InvitationRow, InvitationStatus, MemberRow, TeamInvitation, TeamMember, INVITATION_COLUMNS,
    MEMBER_COLUMNS,
};
use crate::features::shared::roles::decode_role;
use chrono::Utc;
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptInvitationCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    /// Lower-cased e-mail reported by the identity provider
    #[serde(skip)]
    pub email: Option<String>,
    pub token: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum AcceptInvitationError {
    #[error("Invitation not found")]
    NotFound,
    #[error("Invitation is no longer pending")]
    NotPending,
    #[error("Invitation has expired")]
    Expired,
    #[error("This invitation was sent to a different e-mail address")]
    EmailMismatch,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<TeamMember, AcceptInvitationError>> for AcceptInvitationCommand {}

impl crate::cqrs::middleware::Command for AcceptInvitationCommand {}

impl AcceptInvitationCommand {
    /// Status, expiry and recipient checks against a locked invitation
    pub fn check(&self, invitation: &TeamInvitation) -> Result<(), AcceptInvitationError> {
        if invitation.status != InvitationStatus::Pending {
            return Err(AcceptInvitationError::NotPending);
        }
        if invitation.is_expired_at(Utc::now()) {
            return Err(AcceptInvitationError::Expired);
        }
        match &self.email {
            Some(email) if email.eq_ignore_ascii_case(&invitation.email) => Ok(()),
            _ => Err(AcceptInvitationError::EmailMismatch),
        }
    }
}

#[tracing::instrument(skip(pool, command), fields(user_id = %command.user_id))]
pub async fn handle(
    pool: PgPool,
    command: AcceptInvitationCommand,
) -> Result<TeamMember, AcceptInvitationError> {
    let mut tx = pool.begin().await?;

    let invitation: TeamInvitation = sqlx::query_as::<_, InvitationRow>(&format!(
        "SELECT {} FROM team_invitations WHERE token = $1 FOR UPDATE",
        INVITATION_COLUMNS
    ))
    .bind(command.token)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AcceptInvitationError::NotFound)?
    .try_into()?;

    command.check(&invitation)?;

    let current: Option<String> =
        sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1 FOR UPDATE")
            .bind(command.user_id)
            .fetch_optional(&mut *tx)
            .await?;
    let role = match current.as_deref().map(decode_role).transpose()? {
        Some(existing) => existing.max(invitation.role),
        None => invitation.role,
    };

    let member: TeamMember = sqlx::query_as::<_, MemberRow>(&format!(
        "INSERT INTO user_roles (user_id, email, role)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id) DO UPDATE
         SET email = EXCLUDED.email, role = EXCLUDED.role, updated_at = NOW()
         RETURNING {}",
        MEMBER_COLUMNS
    ))
    .bind(command.user_id)
    .bind(&invitation.email)
    .bind(role.as_str())
    .fetch_one(&mut *tx)
    .await?
    .try_into()?;

    sqlx::query(
        "UPDATE team_invitations SET status = 'accepted', accepted_at = NOW() WHERE id = $1",
    )
    .bind(invitation.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(invitation_id = %invitation.id, role = %member.role, "Invitation accepted");

    Ok(member)
}


#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::features::shared::test_helpers::TestMember;
    use crate::features::team::commands::invite::{self, InviteMemberCommand, InviteMemberError};
    use neurika_common::types::TeamRole;

    async fn invite(pool: &PgPool, admin: Uuid, email: &str, role: TeamRole) -> Uuid {
        invite::handle(
            pool.clone(),
            None,
            InviteMemberCommand {
                user_id: admin,
                email: email.to_string(),
                role,
                message: None,
            },
        )
        .await
        .unwrap()
        .token
    }

    // Requires DATABASE_URL pointing at a disposable PostgreSQL server
    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_invite_then_accept(pool: PgPool) -> sqlx::Result<()> {
        let admin = TestMember::new(TeamRole::Admin).insert(&pool).await?;
        let token = invite(&pool, admin.user_id, "New@Example.com", TeamRole::Editor).await;

        let user_id = Uuid::new_v4();
        let member = handle(
            pool.clone(),
            AcceptInvitationCommand {
                user_id,
                email: Some("new@example.com".into()),
                token,
            },
        )
        .await
        .unwrap();
        assert_eq!(member.user_id, user_id);
        assert_eq!(member.role, TeamRole::Editor);

        // A second acceptance of the same token fails
        let again = handle(
            pool,
            AcceptInvitationCommand {
                user_id,
                email: Some("new@example.com".into()),
                token,
            },
        )
        .await;
        assert!(matches!(again, Err(AcceptInvitationError::NotPending)));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_duplicate_pending_invitation_conflicts(pool: PgPool) -> sqlx::Result<()> {
        let admin = TestMember::new(TeamRole::Admin).insert(&pool).await?;
        invite(&pool, admin.user_id, "dup@example.com", TeamRole::Reader).await;

        let result = invite::handle(
            pool,
            None,
            InviteMemberCommand {
                user_id: admin.user_id,
                email: "DUP@example.com".into(),
                role: TeamRole::Reader,
                message: None,
            },
        )
        .await;
        assert!(matches!(result, Err(InviteMemberError::AlreadyInvited(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_accept_keeps_higher_role(pool: PgPool) -> sqlx::Result<()> {
        let admin = TestMember::new(TeamRole::Admin).insert(&pool).await?;
        let other_admin = TestMember::new(TeamRole::Admin)
            .with_email("boss@example.com")
            .insert(&pool)
            .await?;

        sqlx::query(
            "INSERT INTO team_invitations (email, role, token, invited_by, expires_at)
             VALUES ($1, 'reader', $2, $3, NOW() + INTERVAL '7 days')",
        )
        .bind(&other_admin.email)
        .bind(Uuid::nil())
        .bind(admin.user_id)
        .execute(&pool)
        .await?;

        let member = handle(
            pool,
            AcceptInvitationCommand {
                user_id: other_admin.user_id,
                email: Some(other_admin.email.clone()),
                token: Uuid::nil(),
            },
        )
        .await
        .unwrap();
        assert_eq!(member.role, TeamRole::Admin);
        Ok(())
    }
}
