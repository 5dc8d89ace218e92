use crate::features::shared::roles::fetch_role;
use mediator::Request;
use neurika_common::types::TeamRole;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyRoleQuery {
    #[serde(skip)]
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MyRoleResponse {
    pub role: Option<TeamRole>,
    /// The team has no members yet and the first admin can be claimed
    pub claimable: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum MyRoleError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<MyRoleResponse, MyRoleError>> for MyRoleQuery {}

impl crate::cqrs::middleware::Query for MyRoleQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: MyRoleQuery) -> Result<MyRoleResponse, MyRoleError> {
    let role = fetch_role(&pool, query.user_id).await?;

    let claimable = match role {
        Some(_) => false,
        None => !sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM user_roles)")
            .fetch_one(&pool)
            .await?,
    };

    Ok(MyRoleResponse { role, claimable })
}
