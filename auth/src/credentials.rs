//! Credential verification and registration.
//!
//! [`CredentialService`] sits between the HTTP layer and an
//! [`AccountRepository`]: it owns normalization, password policy and hashing,
//! so repositories only ever see validated input and PHC hash strings.

use crate::error::{AuthError, Result};
use crate::password::{hash_blocking, validate_password, verify_blocking};
use crate::repository::{Account, AccountRepository, NewAccount};
use helpdesk_core::types::AccountId;
use std::sync::Arc;

/// Verifies and registers credentials against an account repository.
#[derive(Clone)]
pub struct CredentialService {
    accounts: Arc<dyn AccountRepository>,
}

impl CredentialService {
    /// Wrap a repository.
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// The underlying repository.
    #[must_use]
    pub fn accounts(&self) -> &Arc<dyn AccountRepository> {
        &self.accounts
    }

    /// Check an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password alike.
    pub async fn verify(&self, email: &str, plaintext: &str) -> Result<Account> {
        let email = email.trim().to_lowercase();
        let Some((account, stored_hash)) = self.accounts.find_credentials(&email).await? else {
            tracing::debug!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if verify_blocking(plaintext.to_string(), stored_hash).await? {
            tracing::info!(account_id = %account.id, "Credentials verified");
            Ok(account)
        } else {
            tracing::debug!(account_id = %account.id, "Password mismatch");
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Create an account with a hashed password.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidInput`] for a bad name, email or short password
    /// - [`AuthError::DuplicateEmail`] if the email is taken
    pub async fn register(&self, account: NewAccount, plaintext: &str) -> Result<Account> {
        let account = account.normalized()?;
        validate_password(plaintext)?;

        let hash = hash_blocking(plaintext.to_string()).await?;
        let created = self.accounts.insert(account, hash).await?;

        tracing::info!(account_id = %created.id, role = %created.role, "Account registered");
        Ok(created)
    }

    /// Return the account for `account.email`, registering it if absent.
    ///
    /// The boolean is `true` when a new account was created. An existing
    /// account is returned as-is; `plaintext` is not checked against it.
    ///
    /// # Errors
    ///
    /// Same as [`CredentialService::register`], except that a concurrent
    /// registration of the same email resolves to the existing account.
    pub async fn find_or_register(
        &self,
        account: NewAccount,
        plaintext: &str,
    ) -> Result<(Account, bool)> {
        let account = account.normalized()?;
        if let Some(existing) = self.accounts.find_by_email(&account.email).await? {
            return Ok((existing, false));
        }

        let email = account.email.clone();
        match self.register(account, plaintext).await {
            Ok(created) => Ok((created, true)),
            Err(AuthError::DuplicateEmail(_)) => self
                .accounts
                .find_by_email(&email)
                .await?
                .map(|existing| (existing, false))
                .ok_or(AuthError::AccountNotFound),
            Err(e) => Err(e),
        }
    }

    /// Set a new password on an account.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidInput`] for a short password,
    /// [`AuthError::AccountNotFound`] if the account does not exist.
    pub async fn reset_password(&self, id: AccountId, plaintext: &str) -> Result<()> {
        validate_password(plaintext)?;
        let hash = hash_blocking(plaintext.to_string()).await?;
        self.accounts.update_password_hash(id, hash).await?;
        tracing::info!(account_id = %id, "Password reset");
        Ok(())
    }
}
