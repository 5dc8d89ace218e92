//! Command and query markers shared by every feature slice
//!
//! Each operation is a `mediator::Request` with its own result type. Routes
//! call the slice's `handle` directly with the state it needs.

pub mod middleware;
