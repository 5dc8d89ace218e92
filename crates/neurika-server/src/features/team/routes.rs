//! Team API routes
//!
//! - `GET /api/v1/team` - Members, plus pending invitations for admins
//! - `GET /api/v1/team/me` - The caller's role
//! - `POST /api/v1/team/claim` - Become the first admin of an empty team
//! - `POST /api/v1/team/invitations` - Invite by e-mail (admin)
//! - `POST /api/v1/team/invitations/:token/accept` - Accept an invitation
//! - `PATCH /api/v1/team/members/:id` - Change a member's role (admin)
//! - `DELETE /api/v1/team/members/:id` - Remove a member (admin)
//!
//! Member ids are `user_roles.id`, not user ids.

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::auth::AuthUser;
use crate::features::FeatureState;
use crate::mail::Mailer;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    commands::{
        AcceptInvitationCommand, AcceptInvitationError, ClaimFirstAdminCommand,
        ClaimFirstAdminError, InviteMemberCommand, InviteMemberError, RemoveMemberCommand,
        RemoveMemberError, UpdateMemberRoleCommand, UpdateMemberRoleError,
    },
    queries::{ListTeamError, ListTeamQuery, MyRoleError, MyRoleQuery},
};

// ============================================================================
// Router Configuration
// ============================================================================

pub fn team_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_team))
        .route("/me", get(my_role))
        .route("/claim", post(claim_first_admin))
        .route("/invitations", post(invite_member))
        .route("/invitations/:token/accept", post(accept_invitation))
        .route(
            "/members/:id",
            patch(update_member_role).delete(remove_member),
        )
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// `POST /api/v1/team/invitations`
///
/// - `201 Created` - invitation stored; `email_sent` tells whether mail went out
/// - `403 Forbidden` - caller is not an admin
/// - `409 Conflict` - already a member, or already invited
#[tracing::instrument(skip(pool, mailer, command), fields(user_id = %user.id))]
async fn invite_member(
    user: AuthUser,
    State(pool): State<PgPool>,
    State(mailer): State<Option<Mailer>>,
    Json(mut command): Json<InviteMemberCommand>,
) -> Result<Response, TeamApiError> {
    command.user_id = user.id;

    let response = super::commands::invite::handle(pool, mailer.as_ref(), command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn accept_invitation(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(token): Path<Uuid>,
) -> Result<Response, TeamApiError> {
    let command = AcceptInvitationCommand {
        user_id: user.id,
        email: user.email,
        token,
    };

    let member = super::commands::accept_invitation::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(member))).into_response())
}

#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn claim_first_admin(
    user: AuthUser,
    State(pool): State<PgPool>,
) -> Result<Response, TeamApiError> {
    let command = ClaimFirstAdminCommand {
        user_id: user.id,
        email: user.email,
    };

    let member = super::commands::claim_first_admin::handle(pool, command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(member))).into_response())
}

/// `PATCH /api/v1/team/members/:id`
///
/// - `409 Conflict` - self-demotion, or demoting the last admin
#[tracing::instrument(skip(pool, command), fields(user_id = %user.id))]
async fn update_member_role(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(member_id): Path<Uuid>,
    Json(mut command): Json<UpdateMemberRoleCommand>,
) -> Result<Response, TeamApiError> {
    command.user_id = user.id;
    command.member_id = member_id;

    let member = super::commands::update_member_role::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(member))).into_response())
}

/// `DELETE /api/v1/team/members/:id`
///
/// - `409 Conflict` - removing yourself, or the last admin
#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn remove_member(
    user: AuthUser,
    State(pool): State<PgPool>,
    Path(member_id): Path<Uuid>,
) -> Result<Response, TeamApiError> {
    let command = RemoveMemberCommand {
        user_id: user.id,
        member_id,
    };

    let response = super::commands::remove_member::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn list_team(user: AuthUser, State(pool): State<PgPool>) -> Result<Response, TeamApiError> {
    let overview =
        super::queries::list_team::handle(pool, ListTeamQuery { user_id: user.id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(overview))).into_response())
}

#[tracing::instrument(skip(pool), fields(user_id = %user.id))]
async fn my_role(user: AuthUser, State(pool): State<PgPool>) -> Result<Response, TeamApiError> {
    let response = super::queries::my_role::handle(pool, MyRoleQuery { user_id: user.id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum TeamApiError {
    Invite(InviteMemberError),
    Accept(AcceptInvitationError),
    Claim(ClaimFirstAdminError),
    Remove(RemoveMemberError),
    UpdateRole(UpdateMemberRoleError),
    List(ListTeamError),
    MyRole(MyRoleError),
}

impl From<InviteMemberError> for TeamApiError {
    fn from(err: InviteMemberError) -> Self {
        Self::Invite(err)
    }
}

impl From<AcceptInvitationError> for TeamApiError {
    fn from(err: AcceptInvitationError) -> Self {
        Self::Accept(err)
    }
}

impl From<ClaimFirstAdminError> for TeamApiError {
    fn from(err: ClaimFirstAdminError) -> Self {
        Self::Claim(err)
    }
}

impl From<RemoveMemberError> for TeamApiError {
    fn from(err: RemoveMemberError) -> Self {
        Self::Remove(err)
    }
}

impl From<UpdateMemberRoleError> for TeamApiError {
    fn from(err: UpdateMemberRoleError) -> Self {
        Self::UpdateRole(err)
    }
}

impl From<ListTeamError> for TeamApiError {
    fn from(err: ListTeamError) -> Self {
        Self::List(err)
    }
}

impl From<MyRoleError> for TeamApiError {
    fn from(err: MyRoleError) -> Self {
        Self::MyRole(err)
    }
}

impl IntoResponse for TeamApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            TeamApiError::Invite(InviteMemberError::InvalidEmail(_))
            | TeamApiError::Invite(InviteMemberError::Invalid(_)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("VALIDATION_ERROR", self.to_string()),
            ),
            TeamApiError::Invite(InviteMemberError::Forbidden)
            | TeamApiError::Remove(RemoveMemberError::Forbidden)
            | TeamApiError::UpdateRole(UpdateMemberRoleError::Forbidden)
            | TeamApiError::List(ListTeamError::Forbidden)
            | TeamApiError::Accept(AcceptInvitationError::EmailMismatch) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new("FORBIDDEN", self.to_string()),
            ),
            TeamApiError::Accept(AcceptInvitationError::NotFound)
            | TeamApiError::Remove(RemoveMemberError::NotFound(_))
            | TeamApiError::UpdateRole(UpdateMemberRoleError::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", self.to_string()),
            ),
            TeamApiError::Accept(AcceptInvitationError::Expired) => (
                StatusCode::GONE,
                ErrorResponse::new("INVITATION_EXPIRED", self.to_string()),
            ),
            TeamApiError::Invite(InviteMemberError::AlreadyMember(_))
            | TeamApiError::Invite(InviteMemberError::AlreadyInvited(_))
            | TeamApiError::Accept(AcceptInvitationError::NotPending)
            | TeamApiError::Claim(ClaimFirstAdminError::AlreadyClaimed)
            | TeamApiError::Remove(RemoveMemberError::Guard(_))
            | TeamApiError::UpdateRole(UpdateMemberRoleError::Guard(_)) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("CONFLICT", self.to_string()),
            ),
            TeamApiError::Invite(InviteMemberError::Database(_))
            | TeamApiError::Accept(AcceptInvitationError::Database(_))
            | TeamApiError::Claim(ClaimFirstAdminError::Database(_))
            | TeamApiError::Remove(RemoveMemberError::Database(_))
            | TeamApiError::UpdateRole(UpdateMemberRoleError::Database(_))
            | TeamApiError::List(ListTeamError::Database(_))
            | TeamApiError::MyRole(MyRoleError::Database(_)) => {
                tracing::error!("Database error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "A database error occurred"),
                )
            },
        };

        (status, Json(error)).into_response()
    }
}

impl std::fmt::Display for TeamApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamApiError::Invite(e) => write!(f, "{}", e),
            TeamApiError::Accept(e) => write!(f, "{}", e),
            TeamApiError::Claim(e) => write!(f, "{}", e),
            TeamApiError::Remove(e) => write!(f, "{}", e),
            TeamApiError::UpdateRole(e) => write!(f, "{}", e),
            TeamApiError::List(e) => write!(f, "{}", e),
            TeamApiError::MyRole(e) => write!(f, "{}", e),
        }
    }
}
