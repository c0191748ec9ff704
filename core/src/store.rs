//! Persistence abstractions for tickets and comments.
//!
//! The access evaluator never touches these traits; handlers load ownership
//! data through them and pass it in as a [`crate::access::Resource`].
//!
//! # Implementations
//!
//! - `PostgresTicketStore` / `PostgresCommentStore` (in `helpdesk-postgres`)
//! - `InMemoryTicketStore` / `InMemoryCommentStore` (in `helpdesk-testing`)
//!
//! Stores must enforce ticket number uniqueness themselves and report a
//! collision as [`StoreError::DuplicateTicketNumber`]; the issuer relies on
//! that signal to retry.

use crate::numbering::TicketNumber;
use crate::types::{AccountId, CommentId, TicketId, TicketStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by store methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors from ticket and comment stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Another ticket already holds this display number.
    #[error("Ticket number already issued: {0}")]
    DuplicateTicketNumber(String),

    /// The referenced row does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of row, e.g. `"Ticket"`
        resource: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Stored data could not be mapped back to domain types.
    #[error("Corrupt stored data: {0}")]
    Corrupt(String),

    /// Backend failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Shorthand for a missing ticket.
    #[must_use]
    pub fn ticket_not_found(id: TicketId) -> Self {
        Self::NotFound {
            resource: "Ticket",
            id: id.to_string(),
        }
    }

    /// Whether this is a ticket number collision.
    #[must_use]
    pub const fn is_duplicate_number(&self) -> bool {
        matches!(self, Self::DuplicateTicketNumber(_))
    }
}

/// A persisted ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ticket {
    /// Storage key
    pub id: TicketId,
    /// Human-readable number, unique across all tickets
    pub ticket_number: TicketNumber,
    /// Short summary
    pub title: String,
    /// Full description
    pub description: String,
    /// Lifecycle state
    pub status: TicketStatus,
    /// Owning account; `None` for public tickets or after the owner was deleted
    pub owner: Option<AccountId>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a ticket. The number is assigned by the issuer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTicket {
    /// Short summary
    pub title: String,
    /// Full description
    pub description: String,
    /// Owning account, if any
    pub owner: Option<AccountId>,
}

/// Listing filter. Empty fields match everything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Restrict to tickets owned by this account
    pub owner: Option<AccountId>,
    /// Restrict to tickets in this status
    pub status: Option<TicketStatus>,
}

impl TicketFilter {
    /// Filter to one owner.
    #[must_use]
    pub const fn owned_by(owner: AccountId) -> Self {
        Self {
            owner: Some(owner),
            status: None,
        }
    }

    /// Add a status restriction.
    #[must_use]
    pub const fn with_status(mut self, status: Option<TicketStatus>) -> Self {
        self.status = status;
        self
    }

    /// Whether a ticket passes this filter.
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.owner.is_none_or(|owner| ticket.owner == Some(owner))
            && self.status.is_none_or(|status| ticket.status == status)
    }
}

/// Number of tickets in one status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    /// Lifecycle state
    pub status: TicketStatus,
    /// How many tickets are in it
    pub count: u64,
}

/// A comment on a ticket. Comments are append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Storage key
    pub id: CommentId,
    /// Ticket the comment belongs to
    pub ticket_id: TicketId,
    /// Author; `None` once the author's account is deleted
    pub author: Option<AccountId>,
    /// Comment text
    pub body: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Ticket persistence.
pub trait TicketStore: Send + Sync {
    /// Insert a ticket under `number`.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateTicketNumber`] if the number is already taken.
    fn insert(&self, ticket: NewTicket, number: TicketNumber) -> StoreFuture<'_, Ticket>;

    /// Fetch a ticket by id.
    fn get(&self, id: TicketId) -> StoreFuture<'_, Option<Ticket>>;

    /// List tickets matching `filter`, newest first.
    fn list(&self, filter: TicketFilter) -> StoreFuture<'_, Vec<Ticket>>;

    /// Set a ticket's status.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the ticket does not exist.
    fn update_status(&self, id: TicketId, status: TicketStatus) -> StoreFuture<'_, Ticket>;

    /// Highest sequence issued so far, `None` when no tickets exist.
    fn max_issued_sequence(&self) -> StoreFuture<'_, Option<u64>>;

    /// Ticket counts for every status in lifecycle order, zeros included.
    fn status_counts(&self) -> StoreFuture<'_, Vec<StatusCount>>;

    /// Make every ticket owned by `owner` public. Returns how many changed.
    fn release_owner(&self, owner: AccountId) -> StoreFuture<'_, u64>;
}

/// Comment persistence.
pub trait CommentStore: Send + Sync {
    /// Append a comment.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the ticket does not exist.
    fn append(
        &self,
        ticket_id: TicketId,
        author: Option<AccountId>,
        body: String,
    ) -> StoreFuture<'_, Comment>;

    /// Comments on a ticket, newest first.
    fn list_for_ticket(&self, ticket_id: TicketId) -> StoreFuture<'_, Vec<Comment>>;
}

/// Fill in zero counts and order by lifecycle.
///
/// Backends that aggregate with `GROUP BY` only return statuses that occur.
#[must_use]
pub fn complete_status_counts<I>(observed: I) -> Vec<StatusCount>
where
    I: IntoIterator<Item = (TicketStatus, u64)>,
{
    let mut counts = [0u64; TicketStatus::ALL.len()];
    for (status, count) in observed {
        if let Some(index) = TicketStatus::ALL.iter().position(|s| *s == status) {
            counts[index] += count;
        }
    }
    TicketStatus::ALL
        .into_iter()
        .zip(counts)
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbering::TicketNumberFormat;

    fn ticket(owner: Option<AccountId>, status: TicketStatus) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: TicketId::new(),
            ticket_number: TicketNumberFormat::default().number(1),
            title: "Printer".to_string(),
            description: "Out of toner".to_string(),
            status,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_filter_matches() {
        let alice = AccountId::new();
        let t = ticket(Some(alice), TicketStatus::Open);

        assert!(TicketFilter::default().matches(&t));
        assert!(TicketFilter::owned_by(alice).matches(&t));
        assert!(!TicketFilter::owned_by(AccountId::new()).matches(&t));
        assert!(TicketFilter::owned_by(alice)
            .with_status(Some(TicketStatus::Open))
            .matches(&t));
        assert!(!TicketFilter::default()
            .with_status(Some(TicketStatus::Closed))
            .matches(&t));
    }

    #[test]
    fn test_public_ticket_excluded_from_owner_filter() {
        let t = ticket(None, TicketStatus::Open);
        assert!(!TicketFilter::owned_by(AccountId::new()).matches(&t));
    }

    #[test]
    fn test_complete_status_counts_includes_zeros() {
        let counts = complete_status_counts([(TicketStatus::Closed, 2), (TicketStatus::Open, 5)]);
        assert_eq!(
            counts,
            vec![
                StatusCount { status: TicketStatus::Open, count: 5 },
                StatusCount { status: TicketStatus::InProgress, count: 0 },
                StatusCount { status: TicketStatus::Resolved, count: 0 },
                StatusCount { status: TicketStatus::Closed, count: 2 },
            ]
        );
    }

    #[test]
    fn test_duplicate_number_predicate() {
        assert!(StoreError::DuplicateTicketNumber("T000001".into()).is_duplicate_number());
        assert!(!StoreError::Database("down".into()).is_duplicate_number());
    }
}
