pub mod ask;
pub mod create_session;
pub mod delete_session;
pub mod rename_session;

pub use ask::{AskQuestionCommand, AskQuestionError, AskQuestionResponse};
pub use create_session::{CreateSessionCommand, CreateSessionError};
pub use delete_session::{DeleteSessionCommand, DeleteSessionError, DeleteSessionResponse};
pub use rename_session::{RenameSessionCommand, RenameSessionError};
