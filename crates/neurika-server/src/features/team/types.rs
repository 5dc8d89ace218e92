use crate::features::shared::roles::decode_role;
use chrono::{DateTime, Utc};
use neurika_common::types::TeamRole;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Days an invitation stays valid
pub const INVITATION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Revoked,
}

impl InvitationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Revoked => "revoked",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "revoked" => Ok(InvitationStatus::Revoked),
            other => Err(format!("unknown invitation status: {}", other)),
        }
    }
}

/// A team member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMember {
    /// `user_roles.id`, the id used by the member endpoints
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: TeamRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct MemberRow {
    id: Uuid,
    user_id: Uuid,
    email: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) const MEMBER_COLUMNS: &str = "id, user_id, email, role, created_at, updated_at";

impl TryFrom<MemberRow> for TeamMember {
    type Error = sqlx::Error;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            email: row.email,
            role: decode_role(&row.role)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TeamMember {
    /// Lock and return the member with `user_roles.id = id`
    pub(crate) async fn lock<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM user_roles WHERE id = $1 FOR UPDATE",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .map(TeamMember::try_from)
        .transpose()
    }

    pub(crate) async fn all<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM user_roles ORDER BY created_at, id",
            MEMBER_COLUMNS
        ))
        .fetch_all(executor)
        .await?
        .into_iter()
        .map(TeamMember::try_from)
        .collect()
    }
}

/// Lock every admin row and return the admins' user ids.
///
/// Authorizing against this set makes a concurrent demotion of the caller
/// either wait for this transaction or exclude the caller.
pub(crate) async fn lock_admins<'e, E>(executor: E) -> Result<Vec<Uuid>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT user_id FROM user_roles WHERE role = 'admin' FOR UPDATE")
        .fetch_all(executor)
        .await
}

/// A team invitation; the token is never serialized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamInvitation {
    pub id: Uuid,
    pub email: String,
    pub role: TeamRole,
    pub message: Option<String>,
    #[serde(skip_serializing)]
    pub token: Uuid,
    pub invited_by: Uuid,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct InvitationRow {
    id: Uuid,
    email: String,
    role: String,
    message: Option<String>,
    token: Uuid,
    invited_by: Uuid,
    status: String,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

pub(crate) const INVITATION_COLUMNS: &str =
    "id, email, role, message, token, invited_by, status, expires_at, accepted_at, created_at";

impl TryFrom<InvitationRow> for TeamInvitation {
    type Error = sqlx::Error;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: row.email,
            role: decode_role(&row.role)?,
            message: row.message,
            token: row.token,
            invited_by: row.invited_by,
            status: row.status.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?,
            expires_at: row.expires_at,
            accepted_at: row.accepted_at,
            created_at: row.created_at,
        })
    }
}

impl TeamInvitation {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation_row(status: &str) -> InvitationRow {
        let now = Utc::now();
        InvitationRow {
            id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            role: "editor".into(),
            message: None,
            token: Uuid::new_v4(),
            invited_by: Uuid::new_v4(),
            status: status.into(),
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            accepted_at: None,
            created_at: now,
        }
    }

    #[test]
    fn test_invitation_row_decodes() {
        let invitation = TeamInvitation::try_from(invitation_row("pending")).unwrap();
        assert_eq!(invitation.role, TeamRole::Editor);
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert!(!invitation.is_expired_at(Utc::now()));
        assert!(invitation.is_expired_at(Utc::now() + Duration::days(8)));
    }

    #[test]
    fn test_unknown_status_is_decode_error() {
        assert!(matches!(
            TeamInvitation::try_from(invitation_row("expired")),
            Err(sqlx::Error::Decode(_))
        ));
    }

    #[test]
    fn test_token_not_serialized() {
        let invitation = TeamInvitation::try_from(invitation_row("pending")).unwrap();
        let value = serde_json::to_value(&invitation).unwrap();
        assert!(value.get("token").is_none());
        assert_eq!(value["status"], "pending");
    }
}
