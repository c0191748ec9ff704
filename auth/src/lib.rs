//! # Helpdesk Authentication
//!
//! Accounts and credentials for the helpdesk service.
//!
//! - [`CredentialService`]: login verification, registration, password reset
//! - [`AccountRepository`]: account persistence (PostgreSQL or in-memory)
//! - [`password`]: Argon2id hashing, run off the async executor
//!
//! Authorization decisions are not made here; see `helpdesk_core::access`.
//!
//! ## Example
//!
//! ```rust
//! use helpdesk_auth::{CredentialService, NewAccount};
//! use helpdesk_auth::mocks::InMemoryAccountRepository;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let service = CredentialService::new(Arc::new(InMemoryAccountRepository::new()));
//!
//! service
//!     .register(NewAccount::normal("Ana", "ana@example.com"), "correct horse")
//!     .await
//!     .unwrap();
//!
//! let account = service.verify("ana@example.com", "correct horse").await.unwrap();
//! assert_eq!(account.name, "Ana");
//! # });
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod credentials;
pub mod error;
pub mod password;
pub mod repository;
pub mod stores;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use credentials::CredentialService;
pub use error::{AuthError, Result};
pub use repository::{Account, AccountRepository, NewAccount, ProfileUpdate};
