//! aerorest - synthesized REST routing over typed record stores
//!
//! Turns the actions a resource controller declares into a routed,
//! access-controlled, CORS-aware REST surface:
//!
//! - `controller`: controllers, action declarations, access control
//! - `routing`: pattern generation, route table merging and matching
//! - `search`: free-text search filters and pagination
//! - `store`: the record store capability and an in-memory store
//! - `auth`: identities, token validation, authentication methods
//! - `pipeline`: the per-request stage chain and post-processing
//! - `app`: controller/module registry and request dispatch
//! - `http_server`: axum boundary

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod http_server;
pub mod pipeline;
pub mod routing;
pub mod search;
pub mod store;
pub mod telemetry;

pub use app::{Application, ApplicationBuilder, Module};
pub use config::AeroRestConfig;
pub use errors::{ApiError, ApiResult};
