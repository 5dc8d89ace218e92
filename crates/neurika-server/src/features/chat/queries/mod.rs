pub mod get_session;
pub mod list_messages;
pub mod list_sessions;

pub use get_session::{GetSessionError, GetSessionQuery};
pub use list_messages::{ListMessagesError, ListMessagesQuery};
pub use list_sessions::{ListSessionsError, ListSessionsQuery};
