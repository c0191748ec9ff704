//! In-memory ticket and comment stores.
//!
//! Behave like the `PostgreSQL` stores where it matters for tests: ticket
//! numbers are unique, comments require an existing ticket, listings are
//! newest first.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on lock poisoning

use chrono::Utc;
use helpdesk_core::numbering::{TicketNumber, TicketNumberFormat};
use helpdesk_core::store::{
    complete_status_counts, Comment, CommentStore, NewTicket, StatusCount, StoreError, StoreFuture,
    Ticket, TicketFilter, TicketStore,
};
use helpdesk_core::types::{AccountId, CommentId, TicketId, TicketStatus};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// In-memory ticket store.
///
/// The maximum issued sequence is recomputed from the stored display numbers
/// on every read, and the read is a separate step from the insert, so
/// concurrent issuers genuinely race. An optional read latency widens that
/// window for concurrency tests.
///
/// # Example
///
/// ```
/// use helpdesk_testing::InMemoryTicketStore;
/// use helpdesk_core::store::{NewTicket, TicketStore};
/// use helpdesk_core::numbering::TicketNumberFormat;
///
/// # tokio_test::block_on(async {
/// let store = InMemoryTicketStore::new();
/// let number = TicketNumberFormat::default().number(1);
/// let ticket = NewTicket { title: "VPN".into(), description: "Down".into(), owner: None };
///
/// store.insert(ticket, number).await.unwrap();
/// assert_eq!(store.max_issued_sequence().await.unwrap(), Some(1));
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryTicketStore {
    tickets: Arc<RwLock<Vec<Ticket>>>,
    format: TicketNumberFormat,
    read_latency: Option<Duration>,
}

impl InMemoryTicketStore {
    /// Create an empty store using the default number format.
    #[must_use]
    pub fn new() -> Self {
        Self::with_format(TicketNumberFormat::default())
    }

    /// Create an empty store that parses numbers with `format`.
    #[must_use]
    pub fn with_format(format: TicketNumberFormat) -> Self {
        Self {
            tickets: Arc::new(RwLock::new(Vec::new())),
            format,
            read_latency: None,
        }
    }

    /// Sleep for `latency` after each maximum-sequence read.
    #[must_use]
    pub const fn with_read_latency(mut self, latency: Duration) -> Self {
        self.read_latency = Some(latency);
        self
    }

    /// Number of stored tickets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.read().unwrap().len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.read().unwrap().is_empty()
    }

    /// Snapshot of every stored ticket, in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<Ticket> {
        self.tickets.read().unwrap().clone()
    }

    /// Whether a ticket exists.
    #[must_use]
    pub fn contains(&self, id: TicketId) -> bool {
        self.tickets.read().unwrap().iter().any(|t| t.id == id)
    }
}

impl Default for InMemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketStore for InMemoryTicketStore {
    fn insert(&self, ticket: NewTicket, number: TicketNumber) -> StoreFuture<'_, Ticket> {
        Box::pin(async move {
            let mut tickets = self.tickets.write().unwrap();

            if tickets.iter().any(|t| {
                t.ticket_number.as_str() == number.as_str()
                    || t.ticket_number.sequence() == number.sequence()
            }) {
                return Err(StoreError::DuplicateTicketNumber(number.to_string()));
            }

            let now = Utc::now();
            let created = Ticket {
                id: TicketId::new(),
                ticket_number: number,
                title: ticket.title,
                description: ticket.description,
                status: TicketStatus::Open,
                owner: ticket.owner,
                created_at: now,
                updated_at: now,
            };
            tickets.push(created.clone());
            Ok(created)
        })
    }

    fn get(&self, id: TicketId) -> StoreFuture<'_, Option<Ticket>> {
        Box::pin(async move {
            Ok(self
                .tickets
                .read()
                .unwrap()
                .iter()
                .find(|t| t.id == id)
                .cloned())
        })
    }

    fn list(&self, filter: TicketFilter) -> StoreFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            let mut matching: Vec<Ticket> = self
                .tickets
                .read()
                .unwrap()
                .iter()
                .filter(|t| filter.matches(t))
                .cloned()
                .collect();
            matching.sort_by_key(|t| std::cmp::Reverse(t.ticket_number.sequence()));
            Ok(matching)
        })
    }

    fn update_status(&self, id: TicketId, status: TicketStatus) -> StoreFuture<'_, Ticket> {
        Box::pin(async move {
            let mut tickets = self.tickets.write().unwrap();
            let ticket = tickets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| StoreError::ticket_not_found(id))?;
            ticket.status = status;
            ticket.updated_at = Utc::now();
            Ok(ticket.clone())
        })
    }

    fn max_issued_sequence(&self) -> StoreFuture<'_, Option<u64>> {
        Box::pin(async move {
            let max = {
                let tickets = self.tickets.read().unwrap();
                self.format
                    .max_issued(tickets.iter().map(|t| Some(t.ticket_number.as_str())))
            };
            if let Some(latency) = self.read_latency {
                tokio::time::sleep(latency).await;
            }
            Ok(max)
        })
    }

    fn status_counts(&self) -> StoreFuture<'_, Vec<StatusCount>> {
        Box::pin(async move {
            let tickets = self.tickets.read().unwrap();
            Ok(complete_status_counts(tickets.iter().map(|t| (t.status, 1))))
        })
    }

    fn release_owner(&self, owner: AccountId) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let mut tickets = self.tickets.write().unwrap();
            let mut released = 0;
            for ticket in tickets.iter_mut().filter(|t| t.owner == Some(owner)) {
                ticket.owner = None;
                ticket.updated_at = Utc::now();
                released += 1;
            }
            Ok(released)
        })
    }
}

/// In-memory comment store.
///
/// Shares a [`InMemoryTicketStore`] handle to reject comments on unknown tickets.
#[derive(Clone, Debug)]
pub struct InMemoryCommentStore {
    comments: Arc<RwLock<Vec<Comment>>>,
    tickets: InMemoryTicketStore,
}

impl InMemoryCommentStore {
    /// Create an empty comment store bound to `tickets`.
    #[must_use]
    pub fn new(tickets: InMemoryTicketStore) -> Self {
        Self {
            comments: Arc::new(RwLock::new(Vec::new())),
            tickets,
        }
    }

    /// Number of stored comments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.comments.read().unwrap().len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comments.read().unwrap().is_empty()
    }

    /// Clear the author of every comment written by `author`.
    ///
    /// Mirrors `ON DELETE SET NULL` on the comment author.
    pub fn forget_author(&self, author: AccountId) {
        for comment in self.comments.write().unwrap().iter_mut() {
            if comment.author == Some(author) {
                comment.author = None;
            }
        }
    }
}

impl CommentStore for InMemoryCommentStore {
    fn append(
        &self,
        ticket_id: TicketId,
        author: Option<AccountId>,
        body: String,
    ) -> StoreFuture<'_, Comment> {
        Box::pin(async move {
            if !self.tickets.contains(ticket_id) {
                return Err(StoreError::ticket_not_found(ticket_id));
            }
            let comment = Comment {
                id: CommentId::new(),
                ticket_id,
                author,
                body,
                created_at: Utc::now(),
            };
            self.comments.write().unwrap().push(comment.clone());
            Ok(comment)
        })
    }

    fn list_for_ticket(&self, ticket_id: TicketId) -> StoreFuture<'_, Vec<Comment>> {
        Box::pin(async move {
            // Insertion order reversed is newest first, even with equal timestamps
            Ok(self
                .comments
                .read()
                .unwrap()
                .iter()
                .rev()
                .filter(|c| c.ticket_id == ticket_id)
                .cloned()
                .collect())
        })
    }
}
