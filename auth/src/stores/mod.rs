//! Storage implementations for accounts.
//!
//! - **Account Repository** (PostgreSQL) - Persistent accounts and password hashes

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-exports
#[cfg(feature = "postgres")]
pub use postgres::PostgresAccountRepository;
