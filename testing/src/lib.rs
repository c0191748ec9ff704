//! # Helpdesk Testing
//!
//! Testing utilities for the helpdesk service.
//!
//! This crate provides:
//! - In-memory [`TicketStore`](helpdesk_core::store::TicketStore) and
//!   [`CommentStore`](helpdesk_core::store::CommentStore) implementations
//! - Fixtures for common domain values
//! - proptest strategies for domain types
//!
//! ## Example
//!
//! ```ignore
//! use helpdesk_testing::{fixtures, InMemoryTicketStore};
//!
//! #[tokio::test]
//! async fn test_ticket_flow() {
//!     let store = InMemoryTicketStore::new();
//!     let ticket = store.insert(fixtures::new_ticket("VPN", None), fixtures::number(1)).await?;
//!     assert_eq!(ticket.ticket_number.as_str(), "T000001");
//! }
//! ```

pub mod stores;

/// Fixtures for common domain values.
pub mod fixtures {
    use helpdesk_core::access::Caller;
    use helpdesk_core::numbering::{TicketNumber, TicketNumberFormat};
    use helpdesk_core::store::NewTicket;
    use helpdesk_core::types::{AccountId, Role};

    /// A ticket request with a generated description.
    #[must_use]
    pub fn new_ticket(title: &str, owner: Option<AccountId>) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            description: format!("{title}: details"),
            owner,
        }
    }

    /// A number in the default format.
    #[must_use]
    pub fn number(sequence: u64) -> TicketNumber {
        TicketNumberFormat::default().number(sequence)
    }

    /// A resolved caller with a fresh account id.
    #[must_use]
    pub fn caller(role: Role) -> Caller {
        Caller::new(AccountId::new(), role)
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use helpdesk_core::access::Capability;
    use helpdesk_core::types::{Role, TicketStatus};
    use proptest::prelude::*;

    /// Any role.
    pub fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    /// Any ticket status.
    pub fn any_status() -> impl Strategy<Value = TicketStatus> {
        prop::sample::select(TicketStatus::ALL.to_vec())
    }

    /// Any capability.
    pub fn any_capability() -> impl Strategy<Value = Capability> {
        prop::sample::select(Capability::ALL.to_vec())
    }
}

// Re-export commonly used items
pub use stores::{InMemoryCommentStore, InMemoryTicketStore};
