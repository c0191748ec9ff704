//! Prometheus recorder setup and runtime metrics.
//!
//! The HTTP server renders the recorder's output at `GET /metrics`; there is
//! no separate metrics listener.
//!
//! # Exported Metrics
//!
//! - `helpdesk_ticket_number_conflicts_total` - Ticket number collisions that triggered a retry
//! - `helpdesk_ticket_issue_exhausted_total` - Issuance attempts that ran out of retries
//! - `helpdesk_ticket_issue_duration_seconds` - Time to issue a number and persist a ticket
//!
//! # Example
//!
//! ```rust,no_run
//! use helpdesk_runtime::metrics::install_recorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = install_recorder()?;
//! let body = handle.render();
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

// Re-export metrics macros for use in other crates
pub use metrics::{counter, histogram};

/// Ticket number collisions that triggered a retry.
pub const NUMBER_CONFLICTS_TOTAL: &str = "helpdesk_ticket_number_conflicts_total";
/// Issuance attempts that ran out of retries.
pub const ISSUE_EXHAUSTED_TOTAL: &str = "helpdesk_ticket_issue_exhausted_total";
/// Time to issue a number and persist a ticket.
pub const ISSUE_DURATION_SECONDS: &str = "helpdesk_ticket_issue_duration_seconds";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install the global Prometheus recorder and describe runtime metrics.
///
/// # Errors
///
/// Returns [`MetricsError::Install`] if a recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_metrics();
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Register runtime metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        NUMBER_CONFLICTS_TOTAL,
        "Ticket number collisions that triggered a retry"
    );
    describe_counter!(
        ISSUE_EXHAUSTED_TOTAL,
        "Ticket creations that failed after exhausting number retries"
    );
    describe_histogram!(
        ISSUE_DURATION_SECONDS,
        "Time taken to issue a ticket number and persist the ticket"
    );
}
