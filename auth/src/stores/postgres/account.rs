//! PostgreSQL account repository implementation.
//!
//! Uses the `accounts` table created by the `helpdesk-postgres` migrations.
//!
//! # Example
//!
//! ```no_run
//! use helpdesk_auth::stores::PostgresAccountRepository;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/helpdesk").await?;
//! let repo = PostgresAccountRepository::new(pool);
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::repository::{Account, AccountFuture, AccountRepository, NewAccount, ProfileUpdate};
use chrono::{DateTime, Utc};
use helpdesk_core::types::{AccountId, Role};
use sqlx::PgPool;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, name, email, role, phone, company, area, created_at";

/// `PostgreSQL` account repository.
#[derive(Clone)]
pub struct PostgresAccountRepository {
    /// `PostgreSQL` connection pool.
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    phone: Option<String>,
    company: Option<String>,
    area: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = AuthError;

    fn try_from(row: AccountRow) -> Result<Self> {
        // An unknown stored role is a data error, never a silent downgrade
        let role: Role = row
            .role
            .parse()
            .map_err(|e| AuthError::CorruptRecord(format!("account {}: {e}", row.id)))?;

        Ok(Self {
            id: AccountId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            role,
            phone: row.phone,
            company: row.company,
            area: row.area,
            created_at: row.created_at,
        })
    }
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AuthError {
    move |e| AuthError::DatabaseError(format!("{context}: {e}"))
}

impl PostgresAccountRepository {
    /// Create a new `PostgreSQL` account repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to get account"))?;
        row.map(Account::try_from).transpose()
    }
}

impl AccountRepository for PostgresAccountRepository {
    fn insert(&self, account: NewAccount, password_hash: String) -> AccountFuture<'_, Account> {
        Box::pin(async move {
            let row: AccountRow = sqlx::query_as(&format!(
                r"
                INSERT INTO accounts (id, name, email, role, phone, company, area, password_hash)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {ACCOUNT_COLUMNS}
                "
            ))
            .bind(Uuid::new_v4())
            .bind(&account.name)
            .bind(&account.email)
            .bind(account.role.as_str())
            .bind(&account.phone)
            .bind(&account.company)
            .bind(&account.area)
            .bind(&password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AuthError::DuplicateEmail(account.email.clone());
                    }
                }
                AuthError::DatabaseError(format!("Failed to create account: {e}"))
            })?;

            Account::try_from(row)
        })
    }

    fn find_credentials(&self, email: &str) -> AccountFuture<'_, Option<(Account, String)>> {
        let email = email.to_string();
        Box::pin(async move {
            let row: Option<CredentialRow> = sqlx::query_as(&format!(
                "SELECT {ACCOUNT_COLUMNS}, password_hash FROM accounts WHERE email = $1"
            ))
            .bind(&email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to look up credentials"))?;

            row.map(|row| Ok((Account::try_from(row.account)?, row.password_hash)))
                .transpose()
        })
    }

    fn find_by_email(&self, email: &str) -> AccountFuture<'_, Option<Account>> {
        let email = email.to_string();
        Box::pin(async move {
            let row: Option<AccountRow> =
                sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"))
                    .bind(&email)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(db_error("Failed to get account by email"))?;
            row.map(Account::try_from).transpose()
        })
    }

    fn get(&self, id: AccountId) -> AccountFuture<'_, Option<Account>> {
        Box::pin(self.fetch_one_by_id(id))
    }

    fn get_many(&self, ids: Vec<AccountId>) -> AccountFuture<'_, Vec<Account>> {
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
            let rows: Vec<AccountRow> = sqlx::query_as(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ANY($1)"
            ))
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to get accounts"))?;

            rows.into_iter().map(Account::try_from).collect()
        })
    }

    fn list(&self) -> AccountFuture<'_, Vec<Account>> {
        Box::pin(async move {
            let rows: Vec<AccountRow> = sqlx::query_as(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at, id"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list accounts"))?;

            rows.into_iter().map(Account::try_from).collect()
        })
    }

    fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> AccountFuture<'_, Account> {
        Box::pin(async move {
            // Read-modify-write keeps the normalization rules in one place
            let mut account = self
                .fetch_one_by_id(id)
                .await?
                .ok_or(AuthError::AccountNotFound)?;
            update.apply(&mut account);

            let result = sqlx::query(
                r"
                UPDATE accounts
                SET name = $2, phone = $3, company = $4, area = $5
                WHERE id = $1
                ",
            )
            .bind(id.as_uuid())
            .bind(&account.name)
            .bind(&account.phone)
            .bind(&account.company)
            .bind(&account.area)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update account"))?;

            if result.rows_affected() == 0 {
                return Err(AuthError::AccountNotFound);
            }
            Ok(account)
        })
    }

    fn set_role(&self, id: AccountId, role: Role) -> AccountFuture<'_, Account> {
        Box::pin(async move {
            let row: Option<AccountRow> = sqlx::query_as(&format!(
                "UPDATE accounts SET role = $2 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
            ))
            .bind(id.as_uuid())
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to update role"))?;

            row.map(Account::try_from)
                .transpose()?
                .ok_or(AuthError::AccountNotFound)
        })
    }

    fn update_password_hash(&self, id: AccountId, password_hash: String) -> AccountFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query("UPDATE accounts SET password_hash = $2 WHERE id = $1")
                .bind(id.as_uuid())
                .bind(&password_hash)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to update password"))?;

            if result.rows_affected() == 0 {
                return Err(AuthError::AccountNotFound);
            }
            Ok(())
        })
    }

    fn delete(&self, id: AccountId) -> AccountFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to delete account"))?;
            Ok(result.rows_affected() > 0)
        })
    }
}
