//! `PostgreSQL` ticket and comment stores for the helpdesk service.
//!
//! This crate implements the `TicketStore` and `CommentStore` traits from
//! `helpdesk-core` on top of sqlx, and owns the schema migrations for every
//! helpdesk table (accounts included).
//!
//! Ticket number uniqueness is enforced by unique indexes on both the display
//! number and its sequence value; a violation surfaces as
//! `StoreError::DuplicateTicketNumber` so the issuer can retry.
//!
//! # Example
//!
//! ```no_run
//! use helpdesk_postgres::{migrate, PostgresTicketStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = sqlx::PgPool::connect("postgres://localhost/helpdesk").await?;
//! migrate(&pool).await?;
//! let tickets = PostgresTicketStore::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod comments;
mod tickets;

pub use comments::PostgresCommentStore;
pub use tickets::PostgresTicketStore;

use helpdesk_core::store::StoreError;
use sqlx::PgPool;

/// Apply all pending schema migrations.
///
/// # Errors
///
/// Returns the migrator's error if a migration fails or the applied history
/// does not match the embedded migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

pub(crate) fn database_error(context: &str, e: &sqlx::Error) -> StoreError {
    StoreError::Database(format!("{context}: {e}"))
}

pub(crate) fn to_sequence(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value)
        .map_err(|_| StoreError::Corrupt(format!("negative ticket sequence {value}")))
}

pub(crate) fn from_sequence(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::Corrupt(format!("ticket sequence {value} exceeds BIGINT")))
}
