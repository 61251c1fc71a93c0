// handlers/auth.rs - /auth/* handlers

use axum::extract::State;
use axum::Extension;

use crate::app::AppState;
use crate::auth::IssuedToken;
use crate::database::models::{Account, AccountWithContent};
use crate::dto::{LoginRequest, SignUpRequest};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson, ValidPath};
use crate::types::Role;

/// POST /auth/signup - register a new account with role USER
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SignUpRequest>,
) -> ApiResult<Account> {
    let account = state.auth.sign_up(request, Role::User).await?;
    Ok(ApiResponse::created(account))
}

/// POST /auth/login - exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> ApiResult<IssuedToken> {
    Ok(ApiResponse::success(state.auth.login(request).await?))
}

/// GET /auth/profile - the authenticated account
pub async fn profile(State(state): State<AppState>, Extension(AuthUser(account)): Extension<AuthUser>) -> ApiResult<Account> {
    Ok(ApiResponse::success(state.auth.profile(account.id).await?))
}

/// DELETE /auth/account - soft delete the caller's own account
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
) -> ApiResult<()> {
    state.auth.soft_delete_account(account.id, account.id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /auth/users - every account with the ids of its content
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<AccountWithContent>> {
    Ok(ApiResponse::success(state.auth.list_accounts().await?))
}

/// PATCH /auth/users/:id/upgrade-role - USER to EDITOR
pub async fn upgrade_role(State(state): State<AppState>, ValidPath(id): ValidPath<i64>) -> ApiResult<Account> {
    Ok(ApiResponse::success(state.auth.update_role(id, Role::Editor).await?))
}

/// PATCH /auth/users/:id/downgrade-role - EDITOR to USER
pub async fn downgrade_role(State(state): State<AppState>, ValidPath(id): ValidPath<i64>) -> ApiResult<Account> {
    Ok(ApiResponse::success(state.auth.update_role(id, Role::User).await?))
}
