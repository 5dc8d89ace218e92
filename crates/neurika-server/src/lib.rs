//! Neurika Server Library
#![recursion_limit = "256"]
//!
//! HTTP backend of the Neurika data analyst: users upload tabular datasets,
//! ask questions about them and get answers split into observation,
//! interpretation and actionable conclusion.
//!
//! # Overview
//!
//! - **Datasets**: uploads stored in S3-compatible object storage, profiled on demand
//! - **Chat**: sessions and message history in PostgreSQL
//! - **Answers**: predefined Q&A overrides first, then an OpenAI-compatible completion provider
//! - **Team**: roles and e-mail invitations administered by admins
//!
//! # Architecture
//!
//! Features are vertical slices under [`features`]. Each operation is a
//! command (writes) or a query (reads) with its own `validate()` and error
//! enum; routes translate those errors into the common response envelope in
//! [`api::response`].
//!
//! Every `/api/v1` route requires `Authorization: Bearer <token>`. The token
//! is resolved by [`auth::IdentityClient`] against the identity provider on
//! each request, and team roles are read from the database, never from the
//! request.
//!
//! ## Framework Stack
//!
//! - **Axum**: routing and extractors
//! - **SQLx**: PostgreSQL access and migrations
//! - **Tower**: CORS, tracing, compression and rate limiting layers
//! - **reqwest**: identity, completion and mail HTTP clients
//!
//! # Example
//!
//! ```no_run
//! use neurika_server::{api, config::Config, features::FeatureState};
//!
//! # fn build_state(config: &Config) -> FeatureState { unimplemented!() }
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let app = api::create_router(build_state(&config), &config);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod llm;
pub mod mail;
pub mod middleware;
pub mod storage;

// Re-export commonly used types
pub use error::{AppError, ServerResult};
