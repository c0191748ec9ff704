//! Register the bootstrap administrator.
//!
//! Reads `ADMIN_EMAIL`, `ADMIN_PASSWORD` and optionally `ADMIN_NAME`. Safe to
//! run repeatedly: an existing account is reported, not modified.
//!
//! ```bash
//! ADMIN_EMAIL=root@example.com ADMIN_PASSWORD=change-me-now cargo run --bin create-admin
//! ```

use anyhow::Context;
use helpdesk_auth::stores::PostgresAccountRepository;
use helpdesk_auth::CredentialService;
use helpdesk_server::admin::{ensure_admin, AdminOutcome};
use helpdesk_server::{config::Config, db, init_tracing};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("helpdesk_server=info,create_admin=info");

    let config = Config::from_env().context("Invalid configuration")?;
    let admin = config.require_admin()?;

    let pool = db::connect(&config.database)
        .await
        .context("Failed to prepare the database")?;
    let credentials = CredentialService::new(Arc::new(PostgresAccountRepository::new(pool)));

    match ensure_admin(&credentials, admin).await? {
        AdminOutcome::Created(account) => {
            tracing::info!(account_id = %account.id, email = %account.email, "Administrator ready");
        }
        AdminOutcome::Existing(account) => {
            tracing::info!(
                account_id = %account.id,
                email = %account.email,
                role = %account.role,
                "Account already exists; nothing to do"
            );
        }
    }

    Ok(())
}
