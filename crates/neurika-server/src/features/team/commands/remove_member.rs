//! Remove a member (admins only)

use super::super::guards::{check_member_change, GuardViolation, MemberChange, Target};
use super::super::types::{lock_admins, TeamMember};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveMemberCommand {
    #[serde(skip)]
    pub user_id: Uuid,
    /// `user_roles.id` of the member
    pub member_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveMemberResponse {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveMemberError {
    #[error("Only admins can remove team members")]
    Forbidden,
    #[error("Member '{0}' not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Guard(#[from] GuardViolation),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<RemoveMemberResponse, RemoveMemberError>> for RemoveMemberCommand {}

impl crate::cqrs::middleware::Command for RemoveMemberCommand {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: RemoveMemberCommand,
) -> Result<RemoveMemberResponse, RemoveMemberError> {
    let mut tx = pool.begin().await?;

    let admins = lock_admins(&mut *tx).await?;
    if !admins.contains(&command.user_id) {
        return Err(RemoveMemberError::Forbidden);
    }

    let member = TeamMember::lock(&mut *tx, command.member_id)
        .await?
        .ok_or(RemoveMemberError::NotFound(command.member_id))?;

    check_member_change(
        command.user_id,
        Target {
            user_id: member.user_id,
            role: member.role,
        },
        MemberChange::Remove,
        admins.len(),
    )?;

    sqlx::query("DELETE FROM user_roles WHERE id = $1")
        .bind(member.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(member_id = %member.id, removed_user = %member.user_id, "Team member removed");

    Ok(RemoveMemberResponse {
        id: member.id,
        user_id: member.user_id,
    })
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::features::shared::test_helpers::TestMember;
    use neurika_common::types::TeamRole;
    use std::time::Duration;

    // Requires DATABASE_URL pointing at a disposable PostgreSQL server
    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_admin_removes_editor(pool: PgPool) -> sqlx::Result<()> {
        let admin = TestMember::new(TeamRole::Admin).insert(&pool).await?;
        let editor = TestMember::new(TeamRole::Editor).insert(&pool).await?;

        let removed = handle(
            pool.clone(),
            RemoveMemberCommand {
                user_id: admin.user_id,
                member_id: editor.id,
            },
        )
        .await
        .unwrap();
        assert_eq!(removed.user_id, editor.user_id);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_roles")
            .fetch_one(&pool)
            .await?;
        assert_eq!(remaining, 1);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_non_admin_is_forbidden(pool: PgPool) -> sqlx::Result<()> {
        let editor = TestMember::new(TeamRole::Editor).insert(&pool).await?;
        let reader = TestMember::new(TeamRole::Reader).insert(&pool).await?;

        let result = handle(
            pool,
            RemoveMemberCommand {
                user_id: editor.user_id,
                member_id: reader.id,
            },
        )
        .await;
        assert!(matches!(result, Err(RemoveMemberError::Forbidden)));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_admin_cannot_remove_self(pool: PgPool) -> sqlx::Result<()> {
        let admin = TestMember::new(TeamRole::Admin).insert(&pool).await?;
        TestMember::new(TeamRole::Admin).insert(&pool).await?;

        let result = handle(
            pool,
            RemoveMemberCommand {
                user_id: admin.user_id,
                member_id: admin.id,
            },
        )
        .await;
        assert!(matches!(
            result,
            Err(RemoveMemberError::Guard(GuardViolation::SelfRemoval))
        ));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore]
    async fn test_caller_demoted_mid_request_is_forbidden(pool: PgPool) -> sqlx::Result<()> {
        let caller = TestMember::new(TeamRole::Admin).insert(&pool).await?;
        TestMember::new(TeamRole::Admin).insert(&pool).await?;
        let reader = TestMember::new(TeamRole::Reader).insert(&pool).await?;

        // Hold an uncommitted demotion of the caller while the removal runs
        let mut demotion = pool.begin().await?;
        sqlx::query("UPDATE user_roles SET role = 'editor' WHERE id = $1")
            .bind(caller.id)
            .execute(&mut *demotion)
            .await?;

        let removal = tokio::spawn(handle(
            pool.clone(),
            RemoveMemberCommand {
                user_id: caller.user_id,
                member_id: reader.id,
            },
        ));
        tokio::time::sleep(Duration::from_millis(200)).await;
        demotion.commit().await?;

        let result = removal.await.unwrap();
        assert!(matches!(result, Err(RemoveMemberError::Forbidden)));

        let still_there: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_roles WHERE id = $1)")
                .bind(reader.id)
                .fetch_one(&pool)
                .await?;
        assert!(still_there);
        Ok(())
    }
}
