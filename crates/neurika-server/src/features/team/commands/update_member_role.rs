//! Change a member's role (admins only)

use super::super::guards::{check_member_change, GuardViolation, MemberChange, Target};
use super::super::types::{lock_admins, MemberRow, TeamMember, MEMBER_COLUMNS};
use mediator::Request;
use neurika_common::types::TeamRole;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMemberRoleCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    #[serde(skip)]
    pub member_id: Uuid,
    pub role: TeamRole,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateMemberRoleError {
    #[error("Only admins can change member roles")]
    Forbidden,
    #[error("Member '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Guard(#[from] GuardViolation),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<TeamMember, UpdateMemberRoleError>> for UpdateMemberRoleCommand {}

impl crate::cqrs::middleware::Command for UpdateMemberRoleCommand {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: UpdateMemberRoleCommand,
) -> Result<TeamMember, UpdateMemberRoleError> {
    let mut tx = pool.begin().await?;

    let admins = lock_admins(&mut *tx).await?;
    if !admins.contains(&command.user_id) {
        return Err(UpdateMemberRoleError::Forbidden);
    }

    let member = TeamMember::lock(&mut *tx, command.member_id)
        .await?
        .ok_or(UpdateMemberRoleError::NotFound(command.member_id))?;

    check_member_change(
        command.user_id,
        Target {
            user_id: member.user_id,
            role: member.role,
        },
        MemberChange::ChangeRole(command.role),
        admins.len(),
    )?;

    if member.role == command.role {
        return Ok(member);
    }

    let updated: TeamMember = sqlx::query_as::<_, MemberRow>(&format!(
        "UPDATE user_roles SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
        MEMBER_COLUMNS
    ))
    .bind(member.id)
    .bind(command.role.as_str())
    .fetch_one(&mut *tx)
    .await?
    .try_into()?;

    tx.commit().await?;

    tracing::info!(
        member_id = %updated.id,
        from = %member.role,
        to = %updated.role,
        "Team member role changed"
    );

    Ok(updated)
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::features::shared::test_helpers::TestMember;
    use std::time::Duration;

    // Requires DATABASE_URL pointing at a disposable PostgreSQL server
    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_admin_promotes_reader(pool: PgPool) -> sqlx::Result<()> {
        let admin = TestMember::new(TeamRole::Admin).insert(&pool).await?;
        let reader = TestMember::new(TeamRole::Reader).insert(&pool).await?;

        let updated = handle(
            pool,
            UpdateMemberRoleCommand {
                user_id: admin.user_id,
                member_id: reader.id,
                role: TeamRole::Editor,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.role, TeamRole::Editor);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_caller_demoted_mid_request_is_forbidden(pool: PgPool) -> sqlx::Result<()> {
        let caller = TestMember::new(TeamRole::Admin).insert(&pool).await?;
        TestMember::new(TeamRole::Admin).insert(&pool).await?;
        let reader = TestMember::new(TeamRole::Reader).insert(&pool).await?;

        let mut demotion = pool.begin().await?;
        sqlx::query("UPDATE user_roles SET role = 'reader' WHERE id = $1")
            .bind(caller.id)
            .execute(&mut *demotion)
            .await?;

        let change = tokio::spawn(handle(
            pool.clone(),
            UpdateMemberRoleCommand {
                user_id: caller.user_id,
                member_id: reader.id,
                role: TeamRole::Admin,
            },
        ));
        tokio::time::sleep(Duration::from_millis(200)).await;
        demotion.commit().await?;

        let result = change.await.unwrap();
        assert!(matches!(result, Err(UpdateMemberRoleError::Forbidden)));

        let role: String = sqlx::query_scalar("SELECT role FROM user_roles WHERE id = $1")
            .bind(reader.id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(role, "reader");
        Ok(())
    }
}
