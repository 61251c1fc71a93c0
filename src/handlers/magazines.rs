// handlers/magazines.rs - /magazines handlers

use axum::extract::State;
use axum::Extension;

use crate::app::AppState;
use crate::database::models::Magazine;
use crate::dto::{CreatePost, PostPatch, PostQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson, ValidPath, ValidQuery};
use crate::types::Paged;

/// POST /magazines - EDITOR or ADMIN
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidJson(draft): ValidJson<CreatePost>,
) -> ApiResult<Magazine> {
    Ok(ApiResponse::created(state.magazines.create(&account, draft).await?))
}

/// GET /magazines?page&limit&search&category
pub async fn list(State(state): State<AppState>, ValidQuery(query): ValidQuery<PostQuery>) -> ApiResult<Paged<Magazine>> {
    let page = state.page(query.page, query.limit)?;
    Ok(ApiResponse::success(state.magazines.list(&query.filter(), page).await?))
}

/// GET /magazines/:id
pub async fn get(State(state): State<AppState>, ValidPath(id): ValidPath<i64>) -> ApiResult<Magazine> {
    Ok(ApiResponse::success(state.magazines.get(id).await?))
}

/// PATCH /magazines/:id - editors, author only
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(patch): ValidJson<PostPatch>,
) -> ApiResult<Magazine> {
    Ok(ApiResponse::success(state.magazines.update(id, patch, &account).await?))
}

/// DELETE /magazines/:id - editors, author only
pub async fn remove(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
) -> ApiResult<()> {
    state.magazines.delete(id, &account).await?;
    Ok(ApiResponse::no_content())
}
