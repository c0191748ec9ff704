//! Ticket number issuance.
//!
//! Numbers are assigned optimistically: read the current maximum, compute the
//! next value, insert. The store's unique constraint arbitrates concurrent
//! writers; the loser gets [`StoreError::DuplicateTicketNumber`], re-reads the
//! maximum and tries again after a jittered backoff.
//!
//! ```text
//! attempt ──► max_issued_sequence ──► next_sequence ──► insert
//!    ▲                                                   │
//!    └──────── DuplicateTicketNumber (retry budget) ◄────┘
//! ```
//!
//! A ticket is either persisted with a unique number or the caller gets an
//! error. Nothing is dropped or overwritten.

use crate::metrics::{ISSUE_DURATION_SECONDS, ISSUE_EXHAUSTED_TOTAL, NUMBER_CONFLICTS_TOTAL};
use crate::retry::{retry_if, RetryError, RetryPolicy};
use helpdesk_core::error::CoreError;
use helpdesk_core::numbering::TicketNumberFormat;
use helpdesk_core::store::{NewTicket, StoreError, Ticket, TicketStore};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Why a ticket could not be created.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Number collisions persisted past the retry budget.
    #[error("Ticket numbering is congested; gave up after {attempts} attempts")]
    ServiceUnavailable {
        /// Attempts made before giving up
        attempts: usize,
    },

    /// The next number could not be computed (sequence exhausted).
    #[error(transparent)]
    Numbering(#[from] CoreError),

    /// The store failed for a reason other than a number collision.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IssueError {
    const fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(StoreError::DuplicateTicketNumber(_)))
    }
}

/// Assigns ticket numbers and persists tickets.
#[derive(Clone)]
pub struct TicketIssuer {
    store: Arc<dyn TicketStore>,
    format: TicketNumberFormat,
    policy: RetryPolicy,
}

impl TicketIssuer {
    /// Create an issuer over a ticket store.
    #[must_use]
    pub fn new(
        store: Arc<dyn TicketStore>,
        format: TicketNumberFormat,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            format,
            policy,
        }
    }

    /// The number format in use.
    #[must_use]
    pub const fn format(&self) -> &TicketNumberFormat {
        &self.format
    }

    /// The retry policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Create a ticket with the next free number.
    ///
    /// # Errors
    ///
    /// - [`IssueError::ServiceUnavailable`] when collisions exhaust the retry budget
    /// - [`IssueError::Numbering`] when the sequence space is exhausted
    /// - [`IssueError::Store`] for any other store failure, without retrying
    pub async fn issue(&self, ticket: NewTicket) -> Result<Ticket, IssueError> {
        let started = Instant::now();

        let result = retry_if(
            &self.policy,
            "issue_ticket_number",
            || self.attempt(ticket.clone()),
            IssueError::is_conflict,
        )
        .await;

        metrics::histogram!(ISSUE_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        match result {
            Ok(created) => {
                tracing::info!(
                    ticket_id = %created.id,
                    ticket_number = %created.ticket_number,
                    "Ticket issued"
                );
                Ok(created)
            }
            Err(RetryError::Exhausted { attempts, .. }) => {
                metrics::counter!(ISSUE_EXHAUSTED_TOTAL).increment(1);
                Err(IssueError::ServiceUnavailable { attempts })
            }
            Err(RetryError::Permanent(err)) => Err(err),
        }
    }

    async fn attempt(&self, ticket: NewTicket) -> Result<Ticket, IssueError> {
        let max = self.store.max_issued_sequence().await?;
        let sequence = self.format.next_sequence(max)?;
        let number = self.format.number(sequence);

        match self.store.insert(ticket, number).await {
            Ok(created) => Ok(created),
            Err(err @ StoreError::DuplicateTicketNumber(_)) => {
                tracing::debug!(sequence, "Ticket number already taken");
                metrics::counter!(NUMBER_CONFLICTS_TOTAL).increment(1);
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}
