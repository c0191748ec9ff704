//! Account model and repository trait.

use crate::error::{AuthError, Result};
use chrono::{DateTime, Utc};
use helpdesk_core::types::{AccountId, Role};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`AccountRepository`] methods.
pub type AccountFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// A registered account. Never carries the password hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Account ID
    pub id: AccountId,
    /// Display name
    pub name: String,
    /// Login email, normalized to lowercase
    pub email: String,
    /// Access level
    pub role: Role,
    /// Contact phone
    pub phone: Option<String>,
    /// Company the requester works for
    pub company: Option<String>,
    /// Department or area within the company
    pub area: Option<String>,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

/// Input for creating an account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAccount {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Access level
    pub role: Role,
    /// Contact phone
    pub phone: Option<String>,
    /// Company
    pub company: Option<String>,
    /// Area
    pub area: Option<String>,
}

impl NewAccount {
    /// A normal account with only name and email set.
    #[must_use]
    pub fn normal(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: Role::Normal,
            phone: None,
            company: None,
            area: None,
        }
    }

    /// Trim fields, lowercase the email and validate.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidInput`] for an empty name or a malformed email.
    pub fn normalized(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(AuthError::InvalidInput {
                field: "name",
                reason: "must not be empty",
            });
        }
        self.email = normalize_email(&self.email)?;
        self.phone = non_blank(self.phone);
        self.company = non_blank(self.company);
        self.area = non_blank(self.area);
        Ok(self)
    }
}

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New phone
    pub phone: Option<String>,
    /// New company
    pub company: Option<String>,
    /// New area
    pub area: Option<String>,
}

impl ProfileUpdate {
    /// Apply to an account in place.
    pub fn apply(self, account: &mut Account) {
        if let Some(name) = self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            account.name = name;
        }
        if let Some(phone) = self.phone {
            account.phone = non_blank(Some(phone));
        }
        if let Some(company) = self.company {
            account.company = non_blank(Some(company));
        }
        if let Some(area) = self.area {
            account.area = non_blank(Some(area));
        }
    }
}

/// Lowercase and trim an email, rejecting obviously malformed values.
///
/// # Errors
///
/// Returns [`AuthError::InvalidInput`] unless the value has a non-empty local
/// part, a single `@`, and a domain containing a dot.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    let invalid = AuthError::InvalidInput {
        field: "email",
        reason: "must be a valid address",
    };

    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid);
    };
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid);
    }
    Ok(email)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Account persistence.
///
/// Implementations store the password hash alongside the account but only
/// hand it out through [`AccountRepository::find_credentials`].
pub trait AccountRepository: Send + Sync {
    /// Insert an account with its password hash.
    ///
    /// # Errors
    ///
    /// [`AuthError::DuplicateEmail`] if the email is taken.
    fn insert(&self, account: NewAccount, password_hash: String) -> AccountFuture<'_, Account>;

    /// Look up an account and its stored hash by (normalized) email.
    fn find_credentials(&self, email: &str) -> AccountFuture<'_, Option<(Account, String)>>;

    /// Look up an account by email without the hash.
    fn find_by_email(&self, email: &str) -> AccountFuture<'_, Option<Account>>;

    /// Fetch an account by id.
    fn get(&self, id: AccountId) -> AccountFuture<'_, Option<Account>>;

    /// Fetch several accounts in one round trip. Unknown ids are skipped;
    /// the order of the result is unspecified.
    fn get_many(&self, ids: Vec<AccountId>) -> AccountFuture<'_, Vec<Account>>;

    /// Every account, oldest first.
    fn list(&self) -> AccountFuture<'_, Vec<Account>>;

    /// Persist profile changes.
    ///
    /// # Errors
    ///
    /// [`AuthError::AccountNotFound`] if the account does not exist.
    fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> AccountFuture<'_, Account>;

    /// Change an account's role.
    ///
    /// # Errors
    ///
    /// [`AuthError::AccountNotFound`] if the account does not exist.
    fn set_role(&self, id: AccountId, role: Role) -> AccountFuture<'_, Account>;

    /// Replace an account's password hash.
    ///
    /// # Errors
    ///
    /// [`AuthError::AccountNotFound`] if the account does not exist.
    fn update_password_hash(&self, id: AccountId, password_hash: String) -> AccountFuture<'_, ()>;

    /// Delete an account. Returns `false` if it did not exist.
    fn delete(&self, id: AccountId) -> AccountFuture<'_, bool>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM ").unwrap(), "ana@example.com");
        for bad in [
            "",
            "ana",
            "@example.com",
            "ana@",
            "ana@example",
            "a@b@c.com",
            "an a@example.com",
            "ana@.com",
        ] {
            assert!(normalize_email(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_new_account_normalized() {
        let mut input = NewAccount::normal("  Ana  ", "ANA@example.com");
        input.phone = Some("   ".to_string());
        input.company = Some(" Acme ".to_string());

        let account = input.normalized().unwrap();
        assert_eq!(account.name, "Ana");
        assert_eq!(account.email, "ana@example.com");
        assert_eq!(account.phone, None);
        assert_eq!(account.company.as_deref(), Some("Acme"));

        assert!(NewAccount::normal(" ", "ana@example.com").normalized().is_err());
    }

    #[test]
    fn test_profile_update_leaves_unset_fields() {
        let mut account = Account {
            id: AccountId::new(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            role: Role::Normal,
            phone: Some("555".into()),
            company: Some("Acme".into()),
            area: None,
            created_at: Utc::now(),
        };

        ProfileUpdate {
            area: Some("Finance".into()),
            name: Some("  ".into()),
            ..ProfileUpdate::default()
        }
        .apply(&mut account);

        assert_eq!(account.name, "Ana");
        assert_eq!(account.phone.as_deref(), Some("555"));
        assert_eq!(account.area.as_deref(), Some("Finance"));
    }
}
