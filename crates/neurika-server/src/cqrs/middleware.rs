//! Marker traits separating writes from reads
//!
//! Commands change state and are logged at INFO by their routes; queries are
//! side-effect free.

/// A request that mutates persisted state
pub trait Command {}

/// A request that only reads persisted state
pub trait Query {}
