//! `PostgreSQL` comment store.

use crate::database_error;
use chrono::{DateTime, Utc};
use helpdesk_core::store::{Comment, CommentStore, StoreError, StoreFuture};
use helpdesk_core::types::{AccountId, CommentId, TicketId};
use sqlx::PgPool;
use uuid::Uuid;

/// `PostgreSQL`-backed [`CommentStore`].
#[derive(Clone)]
pub struct PostgresCommentStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    ticket_id: Uuid,
    author_id: Option<Uuid>,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::from_uuid(row.id),
            ticket_id: TicketId::from_uuid(row.ticket_id),
            author: row.author_id.map(AccountId::from_uuid),
            body: row.body,
            created_at: row.created_at,
        }
    }
}

impl PostgresCommentStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CommentStore for PostgresCommentStore {
    fn append(
        &self,
        ticket_id: TicketId,
        author: Option<AccountId>,
        body: String,
    ) -> StoreFuture<'_, Comment> {
        Box::pin(async move {
            let row: CommentRow = sqlx::query_as(
                r"
                INSERT INTO comments (id, ticket_id, author_id, body)
                VALUES ($1, $2, $3, $4)
                RETURNING id, ticket_id, author_id, body, created_at
                ",
            )
            .bind(Uuid::new_v4())
            .bind(ticket_id.as_uuid())
            .bind(author.map(|a| *a.as_uuid()))
            .bind(&body)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return StoreError::ticket_not_found(ticket_id);
                    }
                }
                database_error("Failed to append comment", &e)
            })?;

            Ok(row.into())
        })
    }

    fn list_for_ticket(&self, ticket_id: TicketId) -> StoreFuture<'_, Vec<Comment>> {
        Box::pin(async move {
            let rows: Vec<CommentRow> = sqlx::query_as(
                r"
                SELECT id, ticket_id, author_id, body, created_at
                FROM comments
                WHERE ticket_id = $1
                ORDER BY created_at DESC, id DESC
                ",
            )
            .bind(ticket_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Failed to list comments", &e))?;

            Ok(rows.into_iter().map(Comment::from).collect())
        })
    }
}
