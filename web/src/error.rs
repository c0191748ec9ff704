//! Error types for web handlers.
//!
//! [`AppError`] bridges domain errors and HTTP responses. Every domain error
//! converts into it with `?`, and the `code` field of the JSON body tells
//! clients which outcome they hit.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use helpdesk_auth::AuthError;
use helpdesk_core::access::{AccessDenied, DenyReason};
use helpdesk_core::error::CoreError;
use helpdesk_core::store::StoreError;
use helpdesk_runtime::IssueError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Ticket>, AppError> {
///     let ticket = store.get(id).await?
///         .ok_or_else(|| AppError::not_found("Ticket", id))?;
///     Ok(Json(ticket))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHENTICATED".to_string(),
        )
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 404 for an unknown route.
    #[must_use]
    pub fn route_not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Route not found".to_string(),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            message.into(),
            "CONFLICT".to_string(),
        )
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

/// Unauthenticated callers get 401; role and ownership denials get 403.
impl From<AccessDenied> for AppError {
    fn from(err: AccessDenied) -> Self {
        let status = match err.reason {
            DenyReason::Unauthenticated => StatusCode::UNAUTHORIZED,
            DenyReason::InsufficientRole | DenyReason::NotOwner => StatusCode::FORBIDDEN,
        };
        Self::new(status, err.to_string(), err.reason.code().to_string())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRole(_)
            | CoreError::InvalidStatus(_)
            | CoreError::UnknownCapability(_)
            | CoreError::MalformedTicketNumber { .. } => Self::validation(err.to_string()),
            CoreError::InvalidNumberFormat(_) | CoreError::SequenceOverflow(_) => {
                Self::internal("Ticket numbering failed").with_source(err.into())
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource, id } => Self::not_found(resource, id),
            // Collisions are retried by the issuer; one escaping here means contention
            StoreError::DuplicateTicketNumber(_) => {
                Self::unavailable("Ticket numbering is busy, try again").with_source(err.into())
            }
            StoreError::Corrupt(_) | StoreError::Database(_) => {
                Self::internal("A storage error occurred").with_source(err.into())
            }
        }
    }
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::ServiceUnavailable { .. } => {
                Self::unavailable("Ticket numbering is busy, try again").with_source(err.into())
            }
            IssueError::Numbering(inner) => inner.into(),
            IssueError::Store(inner) => inner.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::new(
                StatusCode::UNAUTHORIZED,
                err.to_string(),
                "INVALID_CREDENTIALS".to_string(),
            ),
            AuthError::DuplicateEmail(_) => Self::new(
                StatusCode::CONFLICT,
                err.to_string(),
                "DUPLICATE_EMAIL".to_string(),
            ),
            AuthError::AccountNotFound => Self::new(
                StatusCode::NOT_FOUND,
                err.to_string(),
                "NOT_FOUND".to_string(),
            ),
            AuthError::InvalidInput { .. } => Self::validation(err.to_string()),
            AuthError::CorruptRecord(_)
            | AuthError::Hashing(_)
            | AuthError::DatabaseError(_)
            | AuthError::InternalError => {
                Self::internal("An internal error occurred").with_source(err.into())
            }
        }
    }
}
