//! Membership change guards
//!
//! Evaluated inside the transaction that holds the admin rows locked, so
//! `admin_count` cannot change underneath the decision.

use neurika_common::types::TeamRole;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberChange {
    Remove,
    ChangeRole(TeamRole),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GuardViolation {
    #[error("You cannot remove yourself from the team")]
    SelfRemoval,
    #[error("You cannot remove your own admin role")]
    SelfDemotion,
    #[error("Cannot remove the last admin")]
    LastAdmin,
}

/// The member a change applies to
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub user_id: Uuid,
    pub role: TeamRole,
}

pub fn check_member_change(
    caller: Uuid,
    target: Target,
    change: MemberChange,
    admin_count: usize,
) -> Result<(), GuardViolation> {
    let is_self = caller == target.user_id;
    let loses_admin = target.role.is_admin()
        && match change {
            MemberChange::Remove => true,
            MemberChange::ChangeRole(role) => !role.is_admin(),
        };

    match change {
        MemberChange::Remove if is_self => return Err(GuardViolation::SelfRemoval),
        MemberChange::ChangeRole(_) if is_self && loses_admin => {
            return Err(GuardViolation::SelfDemotion)
        },
        _ => {},
    }

    if loses_admin && admin_count <= 1 {
        return Err(GuardViolation::LastAdmin);
    }

    Ok(())
}
