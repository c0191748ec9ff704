//! Ticket reporting.
//!
//! - GET /ticket-stats - Ticket counts per status

use crate::server::state::AppState;
use axum::{extract::State, Json};
use helpdesk_core::access::{Capability, Resource};
use helpdesk_core::store::StatusCount;
use helpdesk_web::{AppError, CallerId};
use serde::Serialize;

/// Ticket counts per status.
#[derive(Debug, Serialize)]
pub struct TicketStats {
    /// All tickets
    pub total: u64,
    /// One entry per status in lifecycle order, zeros included
    pub by_status: Vec<StatusCount>,
}

/// Count tickets per status. Staff only.
pub async fn ticket_stats(
    State(state): State<AppState>,
    claimed: CallerId,
) -> Result<Json<TicketStats>, AppError> {
    let caller = state
        .require_caller(claimed, Capability::ViewTicketStats)
        .await?;
    state.authorize(Some(&caller), Capability::ViewTicketStats, Resource::None)?;

    let by_status = state.tickets.status_counts().await?;
    Ok(Json(TicketStats {
        total: by_status.iter().map(|c| c.count).sum(),
        by_status,
    }))
}
