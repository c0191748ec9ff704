//! `PostgreSQL` ticket store.

use crate::{database_error, from_sequence, to_sequence};
use chrono::{DateTime, Utc};
use helpdesk_core::numbering::TicketNumber;
use helpdesk_core::store::{
    complete_status_counts, NewTicket, StatusCount, StoreError, StoreFuture, Ticket, TicketFilter,
    TicketStore,
};
use helpdesk_core::types::{AccountId, TicketId, TicketStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const TICKET_COLUMNS: &str =
    "id, ticket_number, ticket_seq, title, description, status, owner_id, created_at, updated_at";

/// `PostgreSQL`-backed [`TicketStore`].
#[derive(Clone)]
pub struct PostgresTicketStore {
    pool: PgPool,
}

impl PostgresTicketStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_ticket(row: &PgRow) -> Result<Ticket, StoreError> {
        let get_err = |e: sqlx::Error| StoreError::Corrupt(e.to_string());

        let status: String = row.try_get("status").map_err(get_err)?;
        let status: TicketStatus = status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("{e}")))?;
        let sequence = to_sequence(row.try_get("ticket_seq").map_err(get_err)?)?;
        let display: String = row.try_get("ticket_number").map_err(get_err)?;
        let owner: Option<Uuid> = row.try_get("owner_id").map_err(get_err)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(get_err)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(get_err)?;

        Ok(Ticket {
            id: TicketId::from_uuid(row.try_get("id").map_err(get_err)?),
            ticket_number: TicketNumber::from_stored(sequence, display),
            title: row.try_get("title").map_err(get_err)?,
            description: row.try_get("description").map_err(get_err)?,
            status,
            owner: owner.map(AccountId::from_uuid),
            created_at,
            updated_at,
        })
    }
}

impl TicketStore for PostgresTicketStore {
    fn insert(&self, ticket: NewTicket, number: TicketNumber) -> StoreFuture<'_, Ticket> {
        Box::pin(async move {
            let row = sqlx::query(&format!(
                r"
                INSERT INTO tickets (id, ticket_number, ticket_seq, title, description, status, owner_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {TICKET_COLUMNS}
                "
            ))
            .bind(Uuid::new_v4())
            .bind(number.as_str())
            .bind(from_sequence(number.sequence())?)
            .bind(&ticket.title)
            .bind(&ticket.description)
            .bind(TicketStatus::Open.as_str())
            .bind(ticket.owner.map(|owner| *owner.as_uuid()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return StoreError::DuplicateTicketNumber(number.to_string());
                    }
                }
                database_error("Failed to insert ticket", &e)
            })?;

            Self::row_to_ticket(&row)
        })
    }

    fn get(&self, id: TicketId) -> StoreFuture<'_, Option<Ticket>> {
        Box::pin(async move {
            let row = sqlx::query(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to get ticket", &e))?;

            row.as_ref().map(Self::row_to_ticket).transpose()
        })
    }

    fn list(&self, filter: TicketFilter) -> StoreFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            let rows = sqlx::query(&format!(
                r"
                SELECT {TICKET_COLUMNS}
                FROM tickets
                WHERE ($1::uuid IS NULL OR owner_id = $1)
                  AND ($2::text IS NULL OR status = $2)
                ORDER BY ticket_seq DESC
                "
            ))
            .bind(filter.owner.map(|owner| *owner.as_uuid()))
            .bind(filter.status.map(TicketStatus::as_str))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Failed to list tickets", &e))?;

            rows.iter().map(Self::row_to_ticket).collect()
        })
    }

    fn update_status(&self, id: TicketId, status: TicketStatus) -> StoreFuture<'_, Ticket> {
        Box::pin(async move {
            let row = sqlx::query(&format!(
                r"
                UPDATE tickets
                SET status = $2, updated_at = now()
                WHERE id = $1
                RETURNING {TICKET_COLUMNS}
                "
            ))
            .bind(id.as_uuid())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to update ticket status", &e))?
            .ok_or_else(|| StoreError::ticket_not_found(id))?;

            Self::row_to_ticket(&row)
        })
    }

    fn max_issued_sequence(&self) -> StoreFuture<'_, Option<u64>> {
        Box::pin(async move {
            let max: (Option<i64>,) = sqlx::query_as("SELECT MAX(ticket_seq) FROM tickets")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| database_error("Failed to read max ticket sequence", &e))?;

            max.0.map(to_sequence).transpose()
        })
    }

    fn status_counts(&self) -> StoreFuture<'_, Vec<StatusCount>> {
        Box::pin(async move {
            let rows: Vec<(String, i64)> =
                sqlx::query_as("SELECT status, COUNT(*) FROM tickets GROUP BY status")
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| database_error("Failed to count tickets", &e))?;

            let observed = rows
                .into_iter()
                .map(|(status, count)| {
                    let status: TicketStatus = status
                        .parse()
                        .map_err(|e| StoreError::Corrupt(format!("{e}")))?;
                    Ok((status, u64::try_from(count).unwrap_or(0)))
                })
                .collect::<Result<Vec<_>, StoreError>>()?;

            Ok(complete_status_counts(observed))
        })
    }

    fn release_owner(&self, owner: AccountId) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE tickets SET owner_id = NULL, updated_at = now() WHERE owner_id = $1",
            )
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Failed to release tickets", &e))?;

            let released = result.rows_affected();
            tracing::info!(account_id = %owner, released, "Released tickets of account");
            Ok(released)
        })
    }
}
