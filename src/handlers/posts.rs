// handlers/posts.rs - /posts handlers

use axum::extract::State;
use axum::Extension;

use crate::app::AppState;
use crate::database::models::Post;
use crate::dto::{CreatePost, PostPatch, PostQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson, ValidPath, ValidQuery};
use crate::types::Paged;

/// POST /posts
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidJson(draft): ValidJson<CreatePost>,
) -> ApiResult<Post> {
    Ok(ApiResponse::created(state.posts.create(&account, draft).await?))
}

/// GET /posts?page&limit&search&category
pub async fn list(State(state): State<AppState>, ValidQuery(query): ValidQuery<PostQuery>) -> ApiResult<Paged<Post>> {
    let page = state.page(query.page, query.limit)?;
    Ok(ApiResponse::success(state.posts.list(&query.filter(), page).await?))
}

/// GET /posts/:id
pub async fn get(State(state): State<AppState>, ValidPath(id): ValidPath<i64>) -> ApiResult<Post> {
    Ok(ApiResponse::success(state.posts.get(id).await?))
}

/// PATCH /posts/:id - author only
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(patch): ValidJson<PostPatch>,
) -> ApiResult<Post> {
    Ok(ApiResponse::success(state.posts.update(id, patch, &account).await?))
}

/// DELETE /posts/:id - author only, soft delete
pub async fn remove(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
) -> ApiResult<()> {
    state.posts.delete(id, &account).await?;
    Ok(ApiResponse::no_content())
}
