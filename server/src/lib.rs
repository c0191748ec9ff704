//! Helpdesk HTTP service.
//!
//! REST API over the helpdesk stores: accounts, tickets, comments and
//! reports. Every operation is checked against
//! [`helpdesk_core::access::AccessPolicy`]; ticket numbers come from
//! [`helpdesk_runtime::TicketIssuer`].
//!
//! # Binaries
//!
//! - `helpdesk-server`: the HTTP API
//! - `create-admin`: registers the administrator named by `ADMIN_EMAIL`

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod admin;
pub mod api;
pub mod config;
pub mod db;
pub mod metrics;
pub mod server;

pub use config::{Config, ConfigError};
pub use server::{build_router, AppState};

/// Initialise `tracing` with an `EnvFilter` (`RUST_LOG`, falling back to `default_filter`).
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
