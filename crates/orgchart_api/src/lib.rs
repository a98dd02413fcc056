//! HTTP request layer for the organizational hierarchy engine.
//! Translates REST calls into engine operations and engine error kinds
//! into status codes. Holds no business rules of its own.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
