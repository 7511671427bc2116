//! Handlers for the `/users` resource.

use axum::extract::{Query, State};
use axum::Json;
use claimflow_core::roles::Role;
use claimflow_db::models::user::{UserListParams, UserResponse};
use claimflow_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::UsersResponse;
use crate::state::AppState;

/// GET /api/users?role=
///
/// Candidate approvers and signers. Password hashes are never included.
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<UsersResponse<UserResponse>>> {
    let role = params
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()?;

    let users = UserRepo::list(&state.pool, role.map(Role::as_str)).await?;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}
