//! Account profile and administration endpoints.
//!
//! - GET /user/:id - Account profile
//! - PUT /update-user - Edit profile fields
//! - GET /get-all-users - Every account (staff)
//! - PUT /update-user-role - Change an account's role (administrator)
//! - PUT /reset-password/:id - Set a new password (administrator)
//! - DELETE /delete-user/:id - Delete an account (administrator)

use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use helpdesk_auth::{Account, ProfileUpdate};
use helpdesk_core::access::{Capability, Resource};
use helpdesk_core::store::TicketFilter;
use helpdesk_core::types::{AccountId, Role};
use helpdesk_web::{AppError, CallerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to edit profile fields. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// Account ID
    pub id: Uuid,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
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

/// Request to change a role.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// Account ID
    pub id: Uuid,
    /// `normal`, `support` or `administrator`
    pub role: String,
}

/// Request to set a new password.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// New plaintext password
    pub password: String,
}

/// Confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// What happened
    pub message: String,
}

/// Result of deleting an account.
#[derive(Debug, Serialize)]
pub struct DeletedAccount {
    /// The deleted account
    pub id: AccountId,
    /// Tickets that became public
    pub released_tickets: u64,
}

/// Get an account profile.
pub async fn get_user(
    State(state): State<AppState>,
    claimed: CallerId,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, AppError> {
    let caller = state
        .require_caller(claimed, Capability::ViewOwnAccount)
        .await?;
    let id = AccountId::from_uuid(id);
    state.authorize(Some(&caller), Capability::ViewOwnAccount, Resource::Account { id })?;

    let account = state
        .accounts
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Account", id))?;
    Ok(Json(account))
}

/// Edit profile fields.
pub async fn update_user(
    State(state): State<AppState>,
    claimed: CallerId,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<Account>, AppError> {
    let caller = state
        .require_caller(claimed, Capability::UpdateOwnAccount)
        .await?;
    let id = AccountId::from_uuid(request.id);
    state.authorize(Some(&caller), Capability::UpdateOwnAccount, Resource::Account { id })?;

    let update = ProfileUpdate {
        name: request.name,
        phone: request.phone,
        company: request.company,
        area: request.area,
    };
    let account = state.accounts.update_profile(id, update).await?;

    tracing::info!(account_id = %id, by = %caller.account_id, "Profile updated");
    Ok(Json(account))
}

/// List every account.
pub async fn list_users(
    State(state): State<AppState>,
    claimed: CallerId,
) -> Result<Json<Vec<Account>>, AppError> {
    let caller = state.require_caller(claimed, Capability::ManageUsers).await?;
    state.authorize(Some(&caller), Capability::ManageUsers, Resource::None)?;

    Ok(Json(state.accounts.list().await?))
}

/// Change an account's role.
///
/// The role must be exactly `normal`, `support` or `administrator`; anything
/// else is a 422.
pub async fn update_user_role(
    State(state): State<AppState>,
    claimed: CallerId,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<Account>, AppError> {
    let caller = state
        .require_caller(claimed, Capability::ChangeUserRole)
        .await?;
    let id = AccountId::from_uuid(request.id);
    state.authorize(Some(&caller), Capability::ChangeUserRole, Resource::Account { id })?;

    let role: Role = request.role.parse()?;
    let account = state.accounts.set_role(id, role).await?;

    tracing::info!(account_id = %id, %role, by = %caller.account_id, "Role changed");
    Ok(Json(account))
}

/// Set a new password on an account.
pub async fn reset_password(
    State(state): State<AppState>,
    claimed: CallerId,
    Path(id): Path<Uuid>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let caller = state
        .require_caller(claimed, Capability::ResetPassword)
        .await?;
    let id = AccountId::from_uuid(id);
    state.authorize(Some(&caller), Capability::ResetPassword, Resource::Account { id })?;

    state.credentials.reset_password(id, &request.password).await?;
    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}

/// Delete an account. Its tickets become public; its comments lose their author.
///
/// An administrator cannot delete their own account.
pub async fn delete_user(
    State(state): State<AppState>,
    claimed: CallerId,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedAccount>, AppError> {
    let caller = state
        .require_caller(claimed, Capability::DeleteAccount)
        .await?;
    let id = AccountId::from_uuid(id);
    state.authorize(Some(&caller), Capability::DeleteAccount, Resource::Account { id })?;

    if id == caller.account_id {
        return Err(AppError::new(
            StatusCode::CONFLICT,
            "Administrators cannot delete their own account".to_string(),
            "CANNOT_DELETE_SELF".to_string(),
        ));
    }

    if state.accounts.get(id).await?.is_none() {
        return Err(AppError::not_found("Account", id));
    }

    // Delete first: a failed delete must leave the account's tickets with it.
    // PostgreSQL releases them through the foreign key; stores without one
    // are released explicitly afterwards.
    let owned = state.tickets.list(TicketFilter::owned_by(id)).await?;
    if !state.accounts.delete(id).await? {
        return Err(AppError::not_found("Account", id));
    }
    state.tickets.release_owner(id).await?;
    let released_tickets = owned.len() as u64;

    tracing::info!(
        account_id = %id,
        released_tickets,
        by = %caller.account_id,
        "Account deleted"
    );
    Ok(Json(DeletedAccount {
        id,
        released_tickets,
    }))
}
