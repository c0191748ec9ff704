//! Login and self-registration.
//!
//! - POST /login - Verify email and password
//! - POST /register - Create a normal account

use crate::server::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use helpdesk_auth::{Account, NewAccount};
use helpdesk_core::types::Role;
use helpdesk_web::AppError;
use serde::Deserialize;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plaintext password, at least 8 characters
    pub password: String,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Company
    #[serde(default)]
    pub company: Option<String>,
    /// Area
    #[serde(default)]
    pub area: Option<String>,
}

/// Verify credentials and return the account.
///
/// Unknown email and wrong password both yield 401 `INVALID_CREDENTIALS`.
///
/// ```bash
/// curl -X POST http://localhost:3001/login \
///   -H "Content-Type: application/json" \
///   -d '{"email":"ana@example.com","password":"correct horse"}'
/// ```
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Account>, AppError> {
    let account = state
        .credentials
        .verify(&request.email, &request.password)
        .await?;
    Ok(Json(account))
}

/// Register a normal account.
///
/// Self-registration never grants a staff role.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let account = NewAccount {
        name: request.name,
        email: request.email,
        role: Role::Normal,
        phone: request.phone,
        company: request.company,
        area: request.area,
    };

    let created = state.credentials.register(account, &request.password).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
