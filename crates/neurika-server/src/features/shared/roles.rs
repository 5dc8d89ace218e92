//! Team role lookup
//!
//! Roles are always re-read from `user_roles`; nothing the client sends is
//! trusted for authorization.

use neurika_common::types::TeamRole;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Decode a role column, surfacing unknown values as a decode error
pub fn decode_role(value: &str) -> Result<TeamRole, sqlx::Error> {
    value
        .parse::<TeamRole>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// The caller's role, or `None` when they are not a team member
pub async fn fetch_role<'e, E>(executor: E, user_id: Uuid) -> Result<Option<TeamRole>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

    role.as_deref().map(decode_role).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_role() {
        assert_eq!(decode_role("admin").unwrap(), TeamRole::Admin);
        assert!(matches!(decode_role("owner"), Err(sqlx::Error::Decode(_))));
    }
}
