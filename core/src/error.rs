//! Error types for domain parsing and ticket numbering.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the pure domain layer.
///
/// These are configuration or input errors: the domain never falls back to a
/// default when a value is outside its closed set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A role string is not one of `normal`, `support`, `administrator`.
    #[error("Invalid role: {0:?}")]
    InvalidRole(String),

    /// A status string is not one of the ticket lifecycle states.
    #[error("Invalid ticket status: {0:?}")]
    InvalidStatus(String),

    /// A capability tag is not recognised.
    #[error("Unknown capability: {0:?}")]
    UnknownCapability(String),

    /// A display identifier does not match the configured ticket number format.
    #[error("Malformed ticket number {value:?}: {reason}")]
    MalformedTicketNumber {
        /// The offending display identifier
        value: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// The ticket number format itself is invalid (empty prefix, zero width).
    #[error("Invalid ticket number format: {0}")]
    InvalidNumberFormat(&'static str),

    /// The sequence space is exhausted.
    #[error("Ticket sequence overflow after {0}")]
    SequenceOverflow(u64),
}
