//! Team roster for admins and editors
//!
//! Pending invitations are included for admins only, newest first.

use super::super::types::{InvitationRow, TeamInvitation, TeamMember, INVITATION_COLUMNS};
use crate::features::shared::roles::fetch_role;
use mediator::Request;
use neurika_common::types::TeamRole;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTeamQuery {
    #[serde(skip)]
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamOverview {
    pub viewer_role: TeamRole,
    pub members: Vec<TeamMember>,
    pub invitations: Vec<TeamInvitation>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListTeamError {
    #[error("Only admins and editors can view the team")]
    Forbidden,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<TeamOverview, ListTeamError>> for ListTeamQuery {}

impl crate::cqrs::middleware::Query for ListTeamQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: ListTeamQuery) -> Result<TeamOverview, ListTeamError> {
    let viewer_role = fetch_role(&pool, query.user_id)
        .await?
        .filter(|role| role.can_view_team())
        .ok_or(ListTeamError::Forbidden)?;

    let members = TeamMember::all(&pool).await?;

    let invitations = if viewer_role.is_admin() {
        sqlx::query_as::<_, InvitationRow>(&format!(
            "SELECT {} FROM team_invitations WHERE status = 'pending' ORDER BY created_at DESC",
            INVITATION_COLUMNS
        ))
        .fetch_all(&pool)
        .await?
        .into_iter()
        .map(TeamInvitation::try_from)
        .collect::<Result<Vec<_>, _>>()?
    } else {
        Vec::new()
    };

    tracing::debug!(
        members = members.len(),
        invitations = invitations.len(),
        "Team listed"
    );

    Ok(TeamOverview {
        viewer_role,
        members,
        invitations,
    })
}
