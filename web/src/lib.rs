//! Axum integration for the helpdesk service.
//!
//! Handlers stay thin: extract the caller and the request body, check the
//! access policy, call a store or the ticket issuer, map the result to JSON.
//! This crate holds the pieces every handler shares.
//!
//! ```text
//! request ──► correlation_id_layer ──► handler(CallerId, Json<..>)
//!                                          │
//!                      AccessPolicy::evaluate / store / issuer
//!                                          │
//! response ◄── AppError::into_response ◄───┘ (on error)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use helpdesk_web::{AppError, CallerId};
//! use axum::{Router, routing::get, Json};
//!
//! async fn get_ticket(
//!     State(state): State<AppState>,
//!     caller: CallerId,
//!     Path(id): Path<Uuid>,
//! ) -> Result<Json<TicketDetail>, AppError> {
//!     let caller = state.resolve_caller(caller).await?;
//!     let ticket = state.tickets.get(TicketId::from_uuid(id)).await?
//!         .ok_or_else(|| AppError::not_found("Ticket", id))?;
//!     let resource = Resource::Ticket { owner: ticket.owner };
//!     state.policy
//!         .evaluate(caller.as_ref(), Capability::ViewOwnTicket, resource)
//!         .into_result(Capability::ViewOwnTicket)?;
//!     Ok(Json(ticket.into()))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod middleware;

pub use error::AppError;
pub use extractors::{CallerId, CALLER_ID_HEADER};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
