//! HTTP API handlers.
//!
//! Every handler follows the same shape: resolve the caller from `X-User-Id`,
//! load whatever ownership data the access check needs, evaluate the policy,
//! then call the store or issuer.

pub mod accounts;
pub mod comments;
pub mod stats;
pub mod tickets;
pub mod users;

use crate::server::state::AppState;
use helpdesk_auth::Account;
use helpdesk_core::types::AccountId;
use helpdesk_web::AppError;
use serde::Serialize;
use std::collections::HashMap;

/// Maximum ticket title length, in characters.
pub const MAX_TITLE_CHARS: usize = 200;
/// Maximum ticket description length, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 5_000;
/// Maximum comment length, in characters.
pub const MAX_COMMENT_CHARS: usize = 2_000;

/// Name shown for accounts that no longer exist.
pub const DELETED_USER: &str = "Deleted user";

/// Trim `value` and check it is non-empty and at most `max_chars` long.
///
/// # Errors
///
/// Returns a 422 naming `field`.
pub fn required_text(field: &str, value: &str, max_chars: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Who created a ticket or wrote a comment, as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    /// Account id, when the account still exists
    pub account_id: Option<AccountId>,
    /// Display name, or "Deleted user"
    pub name: String,
    /// Email, when the account still exists
    pub email: Option<String>,
}

/// Accounts looked up once per request to label tickets and comments.
#[derive(Debug, Default)]
pub struct Directory {
    accounts: HashMap<AccountId, Account>,
}

impl Directory {
    /// Fetch the accounts behind `ids` in one batch. Duplicates are dropped
    /// before the lookup.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the account store fails.
    pub async fn load(state: &AppState, mut ids: Vec<AccountId>) -> Result<Self, AppError> {
        ids.sort_unstable();
        ids.dedup();

        let accounts = state
            .accounts
            .get_many(ids)
            .await?
            .into_iter()
            .map(|account| (account.id, account))
            .collect();
        Ok(Self { accounts })
    }

    /// Label for an optional account reference.
    #[must_use]
    pub fn person(&self, id: Option<AccountId>) -> Person {
        match id.and_then(|id| self.accounts.get(&id)) {
            Some(account) => Person {
                account_id: Some(account.id),
                name: account.name.clone(),
                email: Some(account.email.clone()),
            },
            None => Person {
                account_id: None,
                name: DELETED_USER.to_string(),
                email: None,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("title", "  VPN down ", 20).unwrap(), "VPN down");
    }

    #[test]
    fn test_required_text_rejects_blank_and_long() {
        let blank = required_text("title", "   ", 20).unwrap_err();
        assert_eq!(blank.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(blank.message(), "title must not be empty");

        let long = required_text("title", &"x".repeat(21), 20).unwrap_err();
        assert_eq!(long.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_unknown_person_is_deleted_user() {
        let directory = Directory::default();
        let person = directory.person(Some(AccountId::new()));
        assert_eq!(person.name, DELETED_USER);
        assert!(person.account_id.is_none());
        assert_eq!(directory.person(None).name, DELETED_USER);
    }

    #[tokio::test]
    async fn test_directory_loads_each_account_once() {
        use helpdesk_auth::mocks::InMemoryAccountRepository;
        use helpdesk_auth::{AccountRepository, NewAccount};
        use helpdesk_core::access::AccessPolicy;
        use helpdesk_core::numbering::TicketNumberFormat;
        use helpdesk_runtime::RetryPolicy;
        use helpdesk_testing::{InMemoryCommentStore, InMemoryTicketStore};
        use std::sync::Arc;

        let accounts = Arc::new(InMemoryAccountRepository::new());
        let tickets = InMemoryTicketStore::new();
        let state = AppState::new(
            accounts.clone(),
            Arc::new(tickets.clone()),
            Arc::new(InMemoryCommentStore::new(tickets)),
            TicketNumberFormat::default(),
            RetryPolicy::default(),
            AccessPolicy::default(),
        );
        let ana = accounts
            .insert(NewAccount::normal("Ana", "ana@example.com"), "h".into())
            .await
            .unwrap();
        let gone = AccountId::new();

        let directory = Directory::load(&state, vec![ana.id, gone, ana.id]).await.unwrap();

        assert_eq!(directory.accounts.len(), 1);
        assert_eq!(directory.person(Some(ana.id)).name, "Ana");
        assert_eq!(directory.person(Some(ana.id)).email.as_deref(), Some("ana@example.com"));
        assert_eq!(directory.person(Some(gone)).name, DELETED_USER);
    }
}
