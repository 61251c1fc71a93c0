// handlers/tea_ratings.rs - /tea-ratings handlers

use axum::extract::State;
use axum::Extension;

use crate::app::AppState;
use crate::database::models::TeaRating;
use crate::dto::{CreateTeaRating, TeaRatingPatch, TeaRatingQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson, ValidPath, ValidQuery};
use crate::types::Paged;

/// POST /tea-ratings - EDITOR or ADMIN
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidJson(draft): ValidJson<CreateTeaRating>,
) -> ApiResult<TeaRating> {
    Ok(ApiResponse::created(state.tea_ratings.create(&account, draft).await?))
}

/// GET /tea-ratings?page&limit&location&min_rating&max_rating
pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<TeaRatingQuery>,
) -> ApiResult<Paged<TeaRating>> {
    let page = state.page(query.page, query.limit)?;
    Ok(ApiResponse::success(state.tea_ratings.list(&query.filter(), page).await?))
}

/// GET /tea-ratings/:id
pub async fn get(State(state): State<AppState>, ValidPath(id): ValidPath<i64>) -> ApiResult<TeaRating> {
    Ok(ApiResponse::success(state.tea_ratings.get(id).await?))
}

/// PATCH /tea-ratings/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(patch): ValidJson<TeaRatingPatch>,
) -> ApiResult<TeaRating> {
    Ok(ApiResponse::success(state.tea_ratings.update(id, patch, &account).await?))
}

/// DELETE /tea-ratings/:id
pub async fn remove(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
) -> ApiResult<()> {
    state.tea_ratings.delete(id, &account).await?;
    Ok(ApiResponse::no_content())
}

/// DELETE /tea-ratings/:id/admin - moderation, any author's rating
pub async fn remove_as_admin(
    State(state): State<AppState>,
    Extension(AuthUser(admin)): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
) -> ApiResult<()> {
    state.tea_ratings.delete_as_admin(id, &admin).await?;
    Ok(ApiResponse::no_content())
}
