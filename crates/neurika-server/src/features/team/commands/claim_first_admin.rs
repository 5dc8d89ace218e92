//! Bootstrap: the first caller on an empty team becomes its admin

use super::super::types::{MemberRow, TeamMember, MEMBER_COLUMNS};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimFirstAdminCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(skip)]
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimFirstAdminError {
    #[error("The team already has members")]
    AlreadyClaimed,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<TeamMember, ClaimFirstAdminError>> for ClaimFirstAdminCommand {}

impl crate::cqrs::middleware::Command for ClaimFirstAdminCommand {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: ClaimFirstAdminCommand,
) -> Result<TeamMember, ClaimFirstAdminError> {
    let mut tx = pool.begin().await?;

    // Two concurrent claims must not both see an empty table
    sqlx::query("LOCK TABLE user_roles IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;

    let members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_roles")
        .fetch_one(&mut *tx)
        .await?;
    if members > 0 {
        return Err(ClaimFirstAdminError::AlreadyClaimed);
    }

    let member: TeamMember = sqlx::query_as::<_, MemberRow>(&format!(
        "INSERT INTO user_roles (user_id, email, role) VALUES ($1, $2, 'admin') RETURNING {}",
        MEMBER_COLUMNS
    ))
    .bind(command.user_id)
    .bind(&command.email)
    .fetch_one(&mut *tx)
    .await?
    .try_into()?;

    tx.commit().await?;

    tracing::info!(user_id = %member.user_id, "First admin claimed the team");

    Ok(member)
}
