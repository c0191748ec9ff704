//! In-memory implementations for use in unit and integration tests.

pub mod account;

pub use account::InMemoryAccountRepository;
