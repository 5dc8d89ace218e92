//! Neurika Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging bootstrap, and error handling for the Neurika workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`NeurikaError`] and the [`Result`] alias
//! - **Logging**: [`logging::init_logging`] configured from the environment
//! - **Types**: domain enums shared by the analysis crate and the server
//!
//! # Example
//!
//! ```no_run
//! use neurika_common::types::AnswerCategory;
//!
//! let category: AnswerCategory = "actionable".parse().unwrap();
//! assert_eq!(category.section_title(), "Actionable Conclusion");
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{NeurikaError, Result};
