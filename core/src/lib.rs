//! # Helpdesk Core
//!
//! Domain types and the two pieces of decision logic shared by every request
//! handler in the helpdesk service:
//!
//! - [`access`]: the table-driven access control evaluator
//! - [`numbering`]: human-readable ticket number formatting and sequencing
//!
//! It also defines the store abstractions ([`store`]) that the persistence
//! crates implement.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │          HTTP handler (server)           │  ← resolves caller, loads resource
//! ├──────────────────────────────────────────┤
//! │  AccessPolicy::evaluate   next_sequence  │  ← pure, synchronous, no I/O
//! ├──────────────────────────────────────────┤
//! │   TicketStore / CommentStore (traits)    │  ← postgres / in-memory
//! └──────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate performs I/O. The evaluator and the numbering
//! functions are safe to call from any number of tasks without coordination.
//!
//! # Example
//!
//! ```
//! use helpdesk_core::access::{AccessPolicy, Caller, Capability, Resource};
//! use helpdesk_core::numbering::TicketNumberFormat;
//! use helpdesk_core::types::{AccountId, Role};
//!
//! let policy = AccessPolicy::default();
//! let caller = Caller::new(AccountId::new(), Role::Support);
//!
//! let decision = policy.evaluate(Some(&caller), Capability::ChangeTicketStatus, Resource::None);
//! assert!(decision.is_allowed());
//!
//! let format = TicketNumberFormat::default();
//! let next = format.next_sequence(Some(41)).unwrap();
//! assert_eq!(format.format(next), "T000042");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod access;
pub mod error;
pub mod numbering;
pub mod store;
pub mod types;

pub use access::{AccessDenied, AccessPolicy, Caller, Capability, Decision, DenyReason, Resource};
pub use error::{CoreError, Result};
pub use numbering::{TicketNumber, TicketNumberFormat};
pub use types::{AccountId, CommentId, Role, TicketId, TicketStatus};
