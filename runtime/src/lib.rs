//! # Helpdesk Runtime
//!
//! Async machinery around the pure domain in `helpdesk-core`.
//!
//! ## Core Components
//!
//! - **Ticket Issuer**: assigns unique ticket numbers under concurrency
//! - **Retry**: exponential backoff with jitter for conflict resolution
//! - **Metrics**: Prometheus recorder and runtime metric descriptions
//!
//! ## Example
//!
//! ```ignore
//! use helpdesk_runtime::{RetryPolicy, TicketIssuer};
//! use helpdesk_core::numbering::TicketNumberFormat;
//!
//! let issuer = TicketIssuer::new(store, TicketNumberFormat::default(), RetryPolicy::default());
//! let ticket = issuer.issue(new_ticket).await?;
//! println!("Created {}", ticket.ticket_number);
//! ```

/// Ticket number assignment with retry on collision
pub mod issuer;

/// Prometheus metrics for observability
pub mod metrics;

/// Retry logic with exponential backoff
pub mod retry;

pub use issuer::{IssueError, TicketIssuer};
pub use retry::{RetryError, RetryPolicy};
