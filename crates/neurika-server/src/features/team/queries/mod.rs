pub mod list_team;
pub mod my_role;

pub use list_team::{ListTeamError, ListTeamQuery, TeamOverview};
pub use my_role::{MyRoleError, MyRoleQuery, MyRoleResponse};
