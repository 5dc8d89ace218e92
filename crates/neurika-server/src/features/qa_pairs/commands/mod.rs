pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateQaPairCommand, CreateQaPairError};
pub use delete::{DeleteQaPairCommand, DeleteQaPairError, DeleteQaPairResponse};
pub use update::{UpdateQaPairCommand, UpdateQaPairError};
