//! In-memory account repository for testing.

use crate::error::{AuthError, Result};
use crate::repository::{Account, AccountFuture, AccountRepository, NewAccount, ProfileUpdate};
use chrono::Utc;
use helpdesk_core::types::{AccountId, Role};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    password_hash: String,
    // Insertion order, for stable listing
    seq: u64,
}

/// In-memory account repository.
///
/// Enforces email uniqueness the way the database's unique index does.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<Mutex<HashMap<AccountId, StoredAccount>>>,
}

impl InMemoryAccountRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InternalError`] if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.accounts.lock().map_err(|_| AuthError::InternalError)?.len())
    }

    /// Whether the repository is empty.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InternalError`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn with_account<T>(
        &self,
        id: AccountId,
        f: impl FnOnce(&mut StoredAccount) -> T,
    ) -> Result<T> {
        let mut guard = self.accounts.lock().map_err(|_| AuthError::InternalError)?;
        guard.get_mut(&id).map(f).ok_or(AuthError::AccountNotFound)
    }
}

impl AccountRepository for InMemoryAccountRepository {
    fn insert(&self, account: NewAccount, password_hash: String) -> AccountFuture<'_, Account> {
        Box::pin(async move {
            let mut guard = self.accounts.lock().map_err(|_| AuthError::InternalError)?;

            if guard.values().any(|stored| stored.account.email == account.email) {
                return Err(AuthError::DuplicateEmail(account.email));
            }

            let created = Account {
                id: AccountId::new(),
                name: account.name,
                email: account.email,
                role: account.role,
                phone: account.phone,
                company: account.company,
                area: account.area,
                created_at: Utc::now(),
            };
            let seq = guard.values().map(|s| s.seq + 1).max().unwrap_or(0);
            guard.insert(
                created.id,
                StoredAccount {
                    account: created.clone(),
                    password_hash,
                    seq,
                },
            );
            Ok(created)
        })
    }

    fn find_credentials(&self, email: &str) -> AccountFuture<'_, Option<(Account, String)>> {
        let email = email.to_string();
        Box::pin(async move {
            let guard = self.accounts.lock().map_err(|_| AuthError::InternalError)?;
            Ok(guard
                .values()
                .find(|stored| stored.account.email == email)
                .map(|stored| (stored.account.clone(), stored.password_hash.clone())))
        })
    }

    fn find_by_email(&self, email: &str) -> AccountFuture<'_, Option<Account>> {
        let email = email.to_string();
        Box::pin(async move {
            let guard = self.accounts.lock().map_err(|_| AuthError::InternalError)?;
            Ok(guard
                .values()
                .find(|stored| stored.account.email == email)
                .map(|stored| stored.account.clone()))
        })
    }

    fn get(&self, id: AccountId) -> AccountFuture<'_, Option<Account>> {
        Box::pin(async move {
            let guard = self.accounts.lock().map_err(|_| AuthError::InternalError)?;
            Ok(guard.get(&id).map(|stored| stored.account.clone()))
        })
    }

    fn get_many(&self, ids: Vec<AccountId>) -> AccountFuture<'_, Vec<Account>> {
        Box::pin(async move {
            let guard = self.accounts.lock().map_err(|_| AuthError::InternalError)?;
            Ok(ids
                .iter()
                .filter_map(|id| guard.get(id))
                .map(|stored| stored.account.clone())
                .collect())
        })
    }

    fn list(&self) -> AccountFuture<'_, Vec<Account>> {
        Box::pin(async move {
            let guard = self.accounts.lock().map_err(|_| AuthError::InternalError)?;
            let mut stored: Vec<&StoredAccount> = guard.values().collect();
            stored.sort_by_key(|s| s.seq);
            Ok(stored.into_iter().map(|s| s.account.clone()).collect())
        })
    }

    fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> AccountFuture<'_, Account> {
        Box::pin(async move {
            self.with_account(id, |stored| {
                update.apply(&mut stored.account);
                stored.account.clone()
            })
        })
    }

    fn set_role(&self, id: AccountId, role: Role) -> AccountFuture<'_, Account> {
        Box::pin(async move {
            self.with_account(id, |stored| {
                stored.account.role = role;
                stored.account.clone()
            })
        })
    }

    fn update_password_hash(&self, id: AccountId, password_hash: String) -> AccountFuture<'_, ()> {
        Box::pin(async move {
            self.with_account(id, |stored| {
                stored.password_hash = password_hash;
            })
        })
    }

    fn delete(&self, id: AccountId) -> AccountFuture<'_, bool> {
        Box::pin(async move {
            let mut guard = self.accounts.lock().map_err(|_| AuthError::InternalError)?;
            Ok(guard.remove(&id).is_some())
        })
    }
}
