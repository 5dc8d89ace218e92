//! Team membership and invitations
//!
//! Roles live in `user_roles` and are re-read on every request. Admins
//! invite, remove and re-role members; admins and editors may view the
//! roster. The guards in [`guards`] keep at least one admin on the team.

pub mod commands;
pub mod guards;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::team_routes;
pub use types::{InvitationStatus, TeamInvitation, TeamMember};
