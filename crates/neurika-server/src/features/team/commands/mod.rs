pub mod accept_invitation;
pub mod claim_first_admin;
pub mod invite;
pub mod remove_member;
pub mod update_member_role;

pub use accept_invitation::{AcceptInvitationCommand, AcceptInvitationError};
pub use claim_first_admin::{ClaimFirstAdminCommand, ClaimFirstAdminError};
pub use invite::{InviteMemberCommand, InviteMemberError, InviteMemberResponse};
pub use remove_member::{RemoveMemberCommand, RemoveMemberError, RemoveMemberResponse};
pub use update_member_role::{UpdateMemberRoleCommand, UpdateMemberRoleError};
