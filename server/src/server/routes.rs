//! Router configuration for the helpdesk.

use super::health::{health_check, metrics_handler, not_found, readiness_check, root};
use super::state::AppState;
use crate::api::{accounts, comments, stats, tickets, users};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use helpdesk_web::correlation_id_layer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the complete Axum router.
///
/// Every request gets a correlation ID and a trace span. CORS is applied by
/// the caller (see [`cors_layer`]) so tests can skip it.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health checks
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        // Accounts
        .route("/login", post(accounts::login))
        .route("/register", post(accounts::register))
        // Tickets
        .route("/tickets", get(tickets::list_tickets))
        .route("/ticket/:id", get(tickets::get_ticket))
        .route("/ticket/:id/comments", post(comments::add_comment))
        .route("/register-ticket", post(tickets::register_ticket))
        .route("/public-ticket", post(tickets::public_ticket))
        .route("/update-ticket", put(tickets::update_ticket))
        .route("/ticket-stats", get(stats::ticket_stats))
        // User administration
        .route("/user/:id", get(users::get_user))
        .route("/update-user", put(users::update_user))
        .route("/get-all-users", get(users::list_users))
        .route("/update-user-role", put(users::update_user_role))
        .route("/reset-password/:id", put(users::reset_password))
        .route("/delete-user/:id", delete(users::delete_user))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}

/// CORS for the configured frontend origin.
///
/// # Errors
///
/// Returns the header error if `origin` is not a valid header value.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-user-id"),
            HeaderName::from_static("x-correlation-id"),
        ])
        .expose_headers([HeaderName::from_static("x-correlation-id")]))
}
