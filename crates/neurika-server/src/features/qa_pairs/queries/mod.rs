pub mod get;
pub mod list;
pub mod match_question;

pub use get::{GetQaPairError, GetQaPairQuery};
pub use list::{ListQaPairsError, ListQaPairsQuery};
pub use match_question::{MatchQaPairError, MatchQaPairQuery, MatchQaPairResponse};
