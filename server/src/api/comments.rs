//! Ticket comments.
//!
//! - POST /ticket/:id/comments - Append a comment authored by the caller

use super::{required_text, MAX_COMMENT_CHARS};
use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use helpdesk_core::access::{Capability, Resource};
use helpdesk_core::store::Comment;
use helpdesk_core::types::TicketId;
use helpdesk_web::{AppError, CallerId};
use serde::Deserialize;
use uuid::Uuid;

/// Request to comment on a ticket.
#[derive(Debug, Deserialize)]
pub struct NewCommentRequest {
    /// Comment text
    pub content: String,
}

/// Append a comment to a ticket.
///
/// Normal accounts may comment on their own tickets (and on public tickets
/// when those are visible); staff may comment on any ticket.
pub async fn add_comment(
    State(state): State<AppState>,
    claimed: CallerId,
    Path(id): Path<Uuid>,
    Json(request): Json<NewCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let caller = state
        .require_caller(claimed, Capability::CommentOnTicket)
        .await?;
    let ticket = state
        .tickets
        .get(TicketId::from_uuid(id))
        .await?
        .ok_or_else(|| AppError::not_found("Ticket", id))?;

    state.authorize(
        Some(&caller),
        Capability::CommentOnTicket,
        Resource::Ticket {
            owner: ticket.owner,
        },
    )?;

    let body = required_text("content", &request.content, MAX_COMMENT_CHARS)?;
    let comment = state
        .comments
        .append(ticket.id, Some(caller.account_id), body)
        .await?;

    tracing::info!(
        ticket_id = %ticket.id,
        comment_id = %comment.id,
        author = %caller.account_id,
        "Comment added"
    );
    Ok((StatusCode::CREATED, Json(comment)))
}
