//! Predefined answers (Q&A overrides)
//!
//! A stored pair answers any question containing one of its keywords, in
//! place of the completion provider. Pairs belong to the user who created them.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::qa_pairs_routes;
pub use types::{KeywordsInput, QaPairRecord};
