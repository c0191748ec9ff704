//! Role-based access control.
//!
//! Every protected operation is classified as a [`Capability`] and evaluated
//! against the caller's [`Role`] by a single table ([`AccessPolicy::grant`]).
//! Handlers resolve the caller and fetch ownership data, then call
//! [`AccessPolicy::evaluate`]; the decision itself performs no I/O.
//!
//! # Decision flow
//!
//! ```text
//! caller unresolved? ──yes──► Deny(Unauthenticated)
//!        │ no
//!        ▼
//! grant(role, capability)
//!   Always ──► Allow
//!   Never  ──► Deny(InsufficientRole)
//!   Owned  ──► resource kind differs from capability ──► Deny(NotOwner)
//!              owner == caller ──► Allow
//!              owner is None and public tickets visible ──► Allow
//!              otherwise ──► Deny(NotOwner)
//! ```
//!
//! # Example
//!
//! ```
//! use helpdesk_core::access::{AccessPolicy, Caller, Capability, DenyReason, Decision, Resource};
//! use helpdesk_core::types::{AccountId, Role};
//!
//! let policy = AccessPolicy::default();
//! let alice = Caller::new(AccountId::new(), Role::Normal);
//!
//! // Own ticket
//! let own = Resource::Ticket { owner: Some(alice.account_id) };
//! assert!(policy.evaluate(Some(&alice), Capability::ViewOwnTicket, own).is_allowed());
//!
//! // Someone else's ticket
//! let other = Resource::Ticket { owner: Some(AccountId::new()) };
//! assert_eq!(
//!     policy.evaluate(Some(&alice), Capability::ViewOwnTicket, other),
//!     Decision::Deny(DenyReason::NotOwner),
//! );
//!
//! // Nobody logged in
//! assert_eq!(
//!     policy.evaluate(None, Capability::ViewOwnTicket, own),
//!     Decision::Deny(DenyReason::Unauthenticated),
//! );
//! ```

use crate::error::CoreError;
use crate::types::{AccountId, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named permission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// List or open any ticket regardless of owner
    ViewAnyTicket,
    /// Open a ticket the caller owns (or a public one)
    ViewOwnTicket,
    /// Open a new ticket
    CreateTicket,
    /// Append a comment to a ticket
    CommentOnTicket,
    /// Move a ticket through its lifecycle
    ChangeTicketStatus,
    /// Read the per-status ticket report
    ViewTicketStats,
    /// Read an account profile
    ViewOwnAccount,
    /// Edit an account profile
    UpdateOwnAccount,
    /// List every account
    ManageUsers,
    /// Change the role of an account
    ChangeUserRole,
    /// Delete an account
    DeleteAccount,
    /// Set a new password on another account
    ResetPassword,
}

impl Capability {
    /// Every capability, in table order.
    pub const ALL: [Self; 12] = [
        Self::ViewAnyTicket,
        Self::ViewOwnTicket,
        Self::CreateTicket,
        Self::CommentOnTicket,
        Self::ChangeTicketStatus,
        Self::ViewTicketStats,
        Self::ViewOwnAccount,
        Self::UpdateOwnAccount,
        Self::ManageUsers,
        Self::ChangeUserRole,
        Self::DeleteAccount,
        Self::ResetPassword,
    ];

    /// Stable kebab-case tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewAnyTicket => "view-any-ticket",
            Self::ViewOwnTicket => "view-own-ticket",
            Self::CreateTicket => "create-ticket",
            Self::CommentOnTicket => "comment-on-ticket",
            Self::ChangeTicketStatus => "change-ticket-status",
            Self::ViewTicketStats => "view-ticket-stats",
            Self::ViewOwnAccount => "view-own-account",
            Self::UpdateOwnAccount => "update-own-account",
            Self::ManageUsers => "manage-users",
            Self::ChangeUserRole => "change-user-role",
            Self::DeleteAccount => "delete-account",
            Self::ResetPassword => "reset-password",
        }
    }

    /// Whether the capability acts on tickets rather than accounts.
    #[must_use]
    pub const fn targets_tickets(self) -> bool {
        matches!(
            self,
            Self::ViewAnyTicket
                | Self::ViewOwnTicket
                | Self::CreateTicket
                | Self::CommentOnTicket
                | Self::ChangeTicketStatus
                | Self::ViewTicketStats
        )
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|capability| capability.as_str() == s)
            .ok_or_else(|| CoreError::UnknownCapability(s.to_string()))
    }
}

/// A resolved caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    /// Account the request is made on behalf of
    pub account_id: AccountId,
    /// Role of that account at resolution time
    pub role: Role,
}

impl Caller {
    /// Create a resolved caller.
    #[must_use]
    pub const fn new(account_id: AccountId, role: Role) -> Self {
        Self { account_id, role }
    }
}

/// Ownership data for the resource an operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    /// The operation has no target resource (listing, reports, creation)
    None,
    /// A ticket; `owner: None` marks a public ticket
    Ticket {
        /// Owning account, if any
        owner: Option<AccountId>,
    },
    /// An account
    Account {
        /// The account being read or modified
        id: AccountId,
    },
}

/// Why an operation was denied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    /// The caller identifier did not resolve to a known account
    Unauthenticated,
    /// The caller's role never grants this capability
    InsufficientRole,
    /// The role grants the capability only on resources the caller owns
    NotOwner,
}

impl DenyReason {
    /// Stable reason code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
            Self::NotOwner => "NOT_OWNER",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of an access check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The operation may proceed
    Allow,
    /// The operation must be rejected
    Deny(DenyReason),
}

impl Decision {
    /// Boolean view of the decision.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Reason code when denied.
    #[must_use]
    pub const fn reason(self) -> Option<DenyReason> {
        match self {
            Self::Allow => None,
            Self::Deny(reason) => Some(reason),
        }
    }

    /// Convert into a `Result` so handlers can use `?`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] carrying the reason when the decision is a denial.
    pub const fn into_result(self, capability: Capability) -> Result<(), AccessDenied> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(AccessDenied { capability, reason }),
        }
    }
}

/// A denied access check, as an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("Access denied for {capability}: {reason}")]
pub struct AccessDenied {
    /// Capability that was requested
    pub capability: Capability,
    /// Why it was denied
    pub reason: DenyReason,
}

impl AccessDenied {
    /// Whether the denial is about identity rather than permissions.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self.reason, DenyReason::Unauthenticated)
    }
}

/// How a role holds a capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grant {
    /// On every resource
    Always,
    /// Only on resources the caller owns
    Owned,
    /// Never
    Never,
}

/// The access control evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Whether normal accounts may see and comment on unowned tickets.
    pub public_tickets_visible: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            public_tickets_visible: true,
        }
    }
}

impl AccessPolicy {
    /// Create a policy.
    #[must_use]
    pub const fn new(public_tickets_visible: bool) -> Self {
        Self {
            public_tickets_visible,
        }
    }

    /// The role/capability table.
    #[must_use]
    pub const fn grant(role: Role, capability: Capability) -> Grant {
        use Capability as C;
        use Grant::{Always, Never, Owned};

        match (role, capability) {
            (Role::Administrator, _) => Always,

            (Role::Support, C::UpdateOwnAccount) => Owned,
            (Role::Support, C::ChangeUserRole | C::DeleteAccount | C::ResetPassword) => Never,
            (Role::Support, _) => Always,

            (Role::Normal, C::CreateTicket) => Always,
            (
                Role::Normal,
                C::ViewOwnTicket | C::CommentOnTicket | C::ViewOwnAccount | C::UpdateOwnAccount,
            ) => Owned,
            (Role::Normal, _) => Never,
        }
    }

    /// Decide whether `caller` may exercise `capability` on `resource`.
    ///
    /// An unresolved caller (`None`) is always denied with
    /// [`DenyReason::Unauthenticated`].
    #[must_use]
    pub fn evaluate(
        &self,
        caller: Option<&Caller>,
        capability: Capability,
        resource: Resource,
    ) -> Decision {
        let Some(caller) = caller else {
            return Decision::Deny(DenyReason::Unauthenticated);
        };

        match Self::grant(caller.role, capability) {
            Grant::Always => Decision::Allow,
            Grant::Never => Decision::Deny(DenyReason::InsufficientRole),
            Grant::Owned => {
                if self.owns(caller, capability, resource) {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::NotOwner)
                }
            }
        }
    }

    /// Ownership check for `Owned` grants.
    ///
    /// Tickets: owner equals the caller, or the ticket has no owner and public
    /// tickets are visible. Accounts: the account is the caller's.
    /// The resource kind must match the capability: a ticket capability is
    /// never satisfied by an account resource, and the reverse.
    fn owns(&self, caller: &Caller, capability: Capability, resource: Resource) -> bool {
        match (capability.targets_tickets(), resource) {
            (true, Resource::Ticket { owner: Some(owner) }) => owner == caller.account_id,
            (true, Resource::Ticket { owner: None }) => self.public_tickets_visible,
            (false, Resource::Account { id }) => id == caller.account_id,
            _ => false,
        }
    }
}
