//! Ticket endpoints.
//!
//! - GET /tickets - List tickets (staff: all, normal accounts: their own)
//! - GET /ticket/:id - Ticket with its comments
//! - POST /register-ticket - Create a ticket as the caller, or anonymously
//! - POST /public-ticket - Find or register an account, then create a ticket for it
//! - PUT /update-ticket - Change a ticket's status

use super::{required_text, Directory, Person, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use crate::metrics::{record_ticket_created, TicketChannel};
use crate::server::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use helpdesk_auth::NewAccount;
use helpdesk_core::access::{Capability, Resource};
use helpdesk_core::store::{Comment, NewTicket, Ticket, TicketFilter};
use helpdesk_core::types::{AccountId, TicketId, TicketStatus};
use helpdesk_web::{AppError, CallerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing tickets.
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsQuery {
    /// Only tickets in this status, e.g. `In Progress`
    pub status: Option<String>,
}

/// A ticket with its creator resolved.
#[derive(Debug, Serialize)]
pub struct TicketView {
    /// The ticket itself
    #[serde(flatten)]
    pub ticket: Ticket,
    /// Who opened it
    pub created_by: Person,
}

/// A comment with its author resolved.
#[derive(Debug, Serialize)]
pub struct CommentView {
    /// The comment itself
    #[serde(flatten)]
    pub comment: Comment,
    /// Who wrote it
    pub written_by: Person,
}

/// A ticket and its comments, newest comment first.
#[derive(Debug, Serialize)]
pub struct TicketDetail {
    /// The ticket
    pub ticket: TicketView,
    /// Its comments
    pub comments: Vec<CommentView>,
}

/// Request to create a ticket.
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    /// Short summary
    pub title: String,
    /// Full description
    pub description: String,
}

/// Response after creating a ticket.
#[derive(Debug, Serialize)]
pub struct CreatedTicket {
    /// Ticket ID
    pub id: TicketId,
    /// Human-readable number
    pub ticket_number: String,
    /// Owning account, `None` for anonymous tickets
    pub owner: Option<AccountId>,
    /// Initial status
    pub status: TicketStatus,
}

impl From<Ticket> for CreatedTicket {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            ticket_number: ticket.ticket_number.to_string(),
            owner: ticket.owner,
            status: ticket.status,
        }
    }
}

/// Request to open a ticket through the public form.
#[derive(Debug, Deserialize)]
pub struct PublicTicketRequest {
    /// Requester name
    pub name: String,
    /// Requester email; an existing account with this email is reused
    pub email: String,
    /// Password for a newly registered account
    #[serde(default)]
    pub password: Option<String>,
    /// Short summary
    pub title: String,
    /// Full description
    pub description: String,
}

/// Response after opening a ticket through the public form.
#[derive(Debug, Serialize)]
pub struct PublicTicketResponse {
    /// The created ticket
    #[serde(flatten)]
    pub ticket: CreatedTicket,
    /// Account the ticket belongs to
    pub account_id: AccountId,
    /// Whether the account was registered by this request
    pub user_created: bool,
}

/// Request to change a ticket's status.
#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    /// Ticket ID
    pub id: Uuid,
    /// New status: `Open`, `In Progress`, `Resolved` or `Closed`
    pub status: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// List tickets, newest first.
///
/// Staff see every ticket; normal accounts see the tickets they own.
///
/// ```bash
/// curl "http://localhost:3001/tickets?status=Open" -H "X-User-Id: <account id>"
/// ```
pub async fn list_tickets(
    State(state): State<AppState>,
    claimed: CallerId,
    Query(query): Query<ListTicketsQuery>,
) -> Result<Json<Vec<TicketView>>, AppError> {
    let caller = state.require_caller(claimed, Capability::ViewOwnTicket).await?;
    let status = query
        .status
        .as_deref()
        .map(str::parse::<TicketStatus>)
        .transpose()?;

    let filter = if state.allows(&caller, Capability::ViewAnyTicket, Resource::None) {
        TicketFilter::default()
    } else {
        TicketFilter::owned_by(caller.account_id)
    }
    .with_status(status);

    let tickets = state.tickets.list(filter).await?;
    let owners: Vec<AccountId> = tickets.iter().filter_map(|t| t.owner).collect();
    let directory = Directory::load(&state, owners).await?;

    Ok(Json(
        tickets
            .into_iter()
            .map(|ticket| TicketView {
                created_by: directory.person(ticket.owner),
                ticket,
            })
            .collect(),
    ))
}

/// Get a ticket and its comments.
///
/// 404 when the ticket does not exist, 403 when the caller may not see it.
pub async fn get_ticket(
    State(state): State<AppState>,
    claimed: CallerId,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketDetail>, AppError> {
    let caller = state.require_caller(claimed, Capability::ViewOwnTicket).await?;
    let ticket = state
        .tickets
        .get(TicketId::from_uuid(id))
        .await?
        .ok_or_else(|| AppError::not_found("Ticket", id))?;

    state.authorize(
        Some(&caller),
        Capability::ViewOwnTicket,
        Resource::Ticket {
            owner: ticket.owner,
        },
    )?;

    let comments = state.comments.list_for_ticket(ticket.id).await?;
    let people: Vec<AccountId> = ticket
        .owner
        .into_iter()
        .chain(comments.iter().filter_map(|c| c.author))
        .collect();
    let directory = Directory::load(&state, people).await?;

    Ok(Json(TicketDetail {
        ticket: TicketView {
            created_by: directory.person(ticket.owner),
            ticket,
        },
        comments: comments
            .into_iter()
            .map(|comment| CommentView {
                written_by: directory.person(comment.author),
                comment,
            })
            .collect(),
    }))
}

/// Create a ticket.
///
/// With `X-User-Id` the caller owns the ticket. Without it the ticket is
/// unowned. A header that is malformed or names an unknown account is
/// rejected with 401 rather than silently creating an unowned ticket.
///
/// ```bash
/// curl -X POST http://localhost:3001/register-ticket \
///   -H "Content-Type: application/json" \
///   -H "X-User-Id: <account id>" \
///   -d '{"title":"VPN down","description":"Cannot connect since 9am"}'
/// ```
pub async fn register_ticket(
    State(state): State<AppState>,
    claimed: CallerId,
    Json(request): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<CreatedTicket>), AppError> {
    let owner = if claimed.is_absent() {
        None
    } else {
        let caller = state.require_caller(claimed, Capability::CreateTicket).await?;
        state.authorize(Some(&caller), Capability::CreateTicket, Resource::None)?;
        Some(caller.account_id)
    };

    let ticket = NewTicket {
        title: required_text("title", &request.title, MAX_TITLE_CHARS)?,
        description: required_text("description", &request.description, MAX_DESCRIPTION_CHARS)?,
        owner,
    };

    let created = state.issuer.issue(ticket).await?;
    record_ticket_created(if owner.is_some() {
        TicketChannel::Account
    } else {
        TicketChannel::Anonymous
    });

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Open a ticket through the public form.
///
/// Reuses the account registered under `email`, or registers a normal
/// account (a password is then required). The ticket belongs to that account.
pub async fn public_ticket(
    State(state): State<AppState>,
    Json(request): Json<PublicTicketRequest>,
) -> Result<(StatusCode, Json<PublicTicketResponse>), AppError> {
    // Validate the ticket first so a bad request does not leave an orphan account
    let title = required_text("title", &request.title, MAX_TITLE_CHARS)?;
    let description = required_text("description", &request.description, MAX_DESCRIPTION_CHARS)?;

    let (account, user_created) = state
        .credentials
        .find_or_register(
            NewAccount::normal(request.name, request.email),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;

    let created = state
        .issuer
        .issue(NewTicket {
            title,
            description,
            owner: Some(account.id),
        })
        .await?;
    record_ticket_created(TicketChannel::Public);

    tracing::info!(
        account_id = %account.id,
        user_created,
        ticket_number = %created.ticket_number,
        "Public ticket opened"
    );

    Ok((
        StatusCode::CREATED,
        Json(PublicTicketResponse {
            ticket: created.into(),
            account_id: account.id,
            user_created,
        }),
    ))
}

/// Change a ticket's status.
///
/// 422 for a status outside the lifecycle set.
pub async fn update_ticket(
    State(state): State<AppState>,
    claimed: CallerId,
    Json(request): Json<UpdateTicketRequest>,
) -> Result<Json<Ticket>, AppError> {
    let caller = state
        .require_caller(claimed, Capability::ChangeTicketStatus)
        .await?;
    let ticket = state
        .tickets
        .get(TicketId::from_uuid(request.id))
        .await?
        .ok_or_else(|| AppError::not_found("Ticket", request.id))?;

    state.authorize(
        Some(&caller),
        Capability::ChangeTicketStatus,
        Resource::Ticket {
            owner: ticket.owner,
        },
    )?;

    let status: TicketStatus = request.status.trim().parse()?;
    let updated = state.tickets.update_status(ticket.id, status).await?;

    tracing::info!(
        ticket_id = %updated.id,
        from = %ticket.status,
        to = %updated.status,
        by = %caller.account_id,
        "Ticket status changed"
    );
    Ok(Json(updated))
}
