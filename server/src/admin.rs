//! Bootstrap administrator.

use crate::config::AdminConfig;
use helpdesk_auth::{Account, AuthError, CredentialService, NewAccount};
use helpdesk_core::types::Role;

/// Outcome of [`ensure_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminOutcome {
    /// A new administrator account was registered
    Created(Account),
    /// An account with the email already existed and was left untouched
    Existing(Account),
}

/// Register the configured administrator unless the email is already taken.
///
/// Running it twice is harmless: the second run reports the existing account.
/// An existing account keeps its role and password.
///
/// # Errors
///
/// [`AuthError::InvalidInput`] for a malformed email or short password, or
/// any store failure.
pub async fn ensure_admin(
    credentials: &CredentialService,
    admin: &AdminConfig,
) -> Result<AdminOutcome, AuthError> {
    let account = NewAccount {
        role: Role::Administrator,
        ..NewAccount::normal(admin.name.clone(), admin.email.clone())
    };

    match credentials.register(account, &admin.password).await {
        Ok(created) => {
            tracing::info!(
                account_id = %created.id,
                email = %created.email,
                "Administrator created"
            );
            Ok(AdminOutcome::Created(created))
        }
        Err(AuthError::DuplicateEmail(email)) => {
            let existing = credentials
                .accounts()
                .find_by_email(&email)
                .await?
                .ok_or(AuthError::AccountNotFound)?;
            if existing.role == Role::Administrator {
                tracing::info!(account_id = %existing.id, "Administrator already exists");
            } else {
                tracing::warn!(
                    account_id = %existing.id,
                    role = %existing.role,
                    "Account exists with a non-administrator role; role left unchanged"
                );
            }
            Ok(AdminOutcome::Existing(existing))
        }
        Err(e) => Err(e),
    }
}
