//! PostgreSQL storage implementations.

pub mod account;

// Re-exports
pub use account::PostgresAccountRepository;
