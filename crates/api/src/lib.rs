//! HTTP surface of OS-REVOKE.
//!
//! Serves `GET /v3/OS-REVOKE/events` to polling clients and `GET /healthz`,
//! and exposes [`state::AppState::revoke`] as the entry point the identity
//! system records revocations through.

pub mod config;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod since;
pub mod state;

pub use config::{Config, ConfigError};
pub use errors::ApiError;
pub use routes::app_router;
pub use state::AppState;
