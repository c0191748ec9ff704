//! Error types for account and credential operations.

use thiserror::Error;

/// Result type alias for account operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failures raised by the credential store and account repository.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Unknown email or wrong password; callers cannot tell which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ═══════════════════════════════════════════════════════════
    // Account Errors
    // ═══════════════════════════════════════════════════════════

    /// An account with this email already exists.
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Requested account not found.
    #[error("Account not found")]
    AccountNotFound,

    /// Input failed validation.
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// A stored row could not be mapped back to an account (e.g. unknown role).
    #[error("Corrupt account record: {0}")]
    CorruptRecord(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Internal error (lock poisoning, task join failure).
    #[error("Internal error")]
    InternalError,
}
