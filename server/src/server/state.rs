//! Application state for the helpdesk HTTP server.
//!
//! Holds the stores, the ticket issuer and the access policy. Handlers
//! resolve the caller and run every access check through [`AppState`], so
//! denials are logged and counted in one place.

use crate::config::{Config, ConfigError};
use crate::metrics::record_access_denied;
use helpdesk_auth::stores::PostgresAccountRepository;
use helpdesk_auth::{AccountRepository, CredentialService};
use helpdesk_core::access::{
    AccessDenied, AccessPolicy, Caller, Capability, Decision, DenyReason, Resource,
};
use helpdesk_core::numbering::TicketNumberFormat;
use helpdesk_core::store::{CommentStore, TicketStore};
use helpdesk_postgres::{PostgresCommentStore, PostgresTicketStore};
use helpdesk_runtime::{RetryPolicy, TicketIssuer};
use helpdesk_web::{AppError, CallerId};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is an `Arc` or a small value.
#[derive(Clone)]
pub struct AppState {
    /// Account persistence
    pub accounts: Arc<dyn AccountRepository>,
    /// Login, registration and password resets
    pub credentials: CredentialService,
    /// Ticket persistence
    pub tickets: Arc<dyn TicketStore>,
    /// Comment persistence
    pub comments: Arc<dyn CommentStore>,
    /// Assigns ticket numbers
    pub issuer: TicketIssuer,
    /// Role and ownership rules
    pub policy: AccessPolicy,
    /// Database pinged by the readiness check, if any
    pub database: Option<PgPool>,
    /// Prometheus handle rendered at `/metrics`, if enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state over arbitrary stores.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        tickets: Arc<dyn TicketStore>,
        comments: Arc<dyn CommentStore>,
        format: TicketNumberFormat,
        retry: RetryPolicy,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            credentials: CredentialService::new(accounts.clone()),
            issuer: TicketIssuer::new(tickets.clone(), format, retry),
            accounts,
            tickets,
            comments,
            policy,
            database: None,
            metrics: None,
        }
    }

    /// Build the state over `PostgreSQL` stores sharing one pool.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the ticket number settings are invalid.
    pub fn from_pool(pool: PgPool, config: &Config) -> Result<Self, ConfigError> {
        let state = Self::new(
            Arc::new(PostgresAccountRepository::new(pool.clone())),
            Arc::new(PostgresTicketStore::new(pool.clone())),
            Arc::new(PostgresCommentStore::new(pool.clone())),
            config.ticket_number_format()?,
            config.retry_policy(),
            config.access_policy(),
        );
        Ok(state.with_database(pool))
    }

    /// Ping `pool` from the readiness check.
    #[must_use]
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }

    /// Serve `handle` at `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Resolve a claimed caller id to an account and its role.
    ///
    /// An absent or malformed header, or an id that matches no account,
    /// resolves to `None`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the account store fails.
    pub async fn resolve_caller(&self, claimed: CallerId) -> Result<Option<Caller>, AppError> {
        let Some(id) = claimed.account_id() else {
            return Ok(None);
        };

        match self.accounts.get(id).await? {
            Some(account) => Ok(Some(Caller::new(account.id, account.role))),
            None => {
                tracing::debug!(account_id = %id, "Caller id does not match any account");
                Ok(None)
            }
        }
    }

    /// Resolve the caller, rejecting unauthenticated requests for `capability`.
    ///
    /// # Errors
    ///
    /// Returns 401 when the caller cannot be resolved.
    pub async fn require_caller(
        &self,
        claimed: CallerId,
        capability: Capability,
    ) -> Result<Caller, AppError> {
        self.resolve_caller(claimed)
            .await?
            .ok_or_else(|| Self::denied(None, capability, DenyReason::Unauthenticated))
    }

    /// Evaluate the access policy for a caller.
    ///
    /// # Errors
    ///
    /// Returns 401 or 403 with the denial reason as the error code.
    pub fn authorize(
        &self,
        caller: Option<&Caller>,
        capability: Capability,
        resource: Resource,
    ) -> Result<(), AppError> {
        match self.policy.evaluate(caller, capability, resource) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(Self::denied(caller, capability, reason)),
        }
    }

    /// Whether the policy would allow a check, without logging a denial.
    #[must_use]
    pub fn allows(&self, caller: &Caller, capability: Capability, resource: Resource) -> bool {
        self.policy
            .evaluate(Some(caller), capability, resource)
            .is_allowed()
    }

    /// Whether the backing database answers.
    pub async fn is_ready(&self) -> bool {
        match &self.database {
            Some(pool) => match sqlx::query("SELECT 1").execute(pool).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "Readiness check failed");
                    false
                }
            },
            None => true,
        }
    }

    fn denied(caller: Option<&Caller>, capability: Capability, reason: DenyReason) -> AppError {
        tracing::info!(
            caller = ?caller.map(|c| c.account_id),
            role = ?caller.map(|c| c.role),
            %capability,
            %reason,
            "Access denied"
        );
        record_access_denied(reason);
        AccessDenied { capability, reason }.into()
    }
}
