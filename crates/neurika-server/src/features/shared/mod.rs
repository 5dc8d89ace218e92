//! Helpers shared by the feature slices
//!
//! - **pagination**: page/per_page parameters and response metadata
//! - **validation**: text and e-mail checks used by command `validate()` methods
//! - **error_helpers**: classification of database constraint violations
//! - **roles**: lookup of the caller's team role
//! - **test_helpers**: row builders for database tests (test-only)

pub mod error_helpers;
pub mod pagination;
pub mod roles;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use pagination::{Paginated, PaginationMetadata, PaginationParams};
pub use validation::{validate_email, validate_text, TextValidationError};
