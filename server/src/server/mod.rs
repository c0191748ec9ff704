//! HTTP server module for the helpdesk.
//!
//! - Application state and access checks
//! - Health, readiness and metrics endpoints
//! - Router and CORS configuration
//! - Graceful shutdown

pub mod health;
pub mod routes;
pub mod shutdown;
pub mod state;

pub use health::health_check;
pub use routes::{build_router, cors_layer};
pub use shutdown::{serve, shutdown_signal};
pub use state::AppState;
