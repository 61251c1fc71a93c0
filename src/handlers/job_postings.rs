// handlers/job_postings.rs - /job-postings handlers
//
// Responses use the presentation shape (`JobPostingView`), not the stored row.

use axum::extract::State;
use axum::Extension;

use crate::app::AppState;
use crate::database::models::JobPostingView;
use crate::dto::{CreateJobPosting, JobPostingPatch, JobPostingQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson, ValidPath, ValidQuery};
use crate::types::Paged;

/// POST /job-postings - EDITOR or ADMIN
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidJson(posting): ValidJson<CreateJobPosting>,
) -> ApiResult<JobPostingView> {
    let created = state.job_postings.create(&account, posting).await?;
    Ok(ApiResponse::created(created.into()))
}

/// GET /job-postings - active postings only
pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<JobPostingQuery>,
) -> ApiResult<Paged<JobPostingView>> {
    let page = state.page(query.page, query.limit)?;
    let postings = state.job_postings.list(&query.filter(), page).await?;
    Ok(ApiResponse::success(postings.map(JobPostingView::from)))
}

/// GET /job-postings/:id - counts a view
pub async fn get(State(state): State<AppState>, ValidPath(id): ValidPath<i64>) -> ApiResult<JobPostingView> {
    Ok(ApiResponse::success(state.job_postings.get(id).await?.into()))
}

/// PATCH /job-postings/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(patch): ValidJson<JobPostingPatch>,
) -> ApiResult<JobPostingView> {
    let updated = state.job_postings.update(id, patch, &account).await?;
    Ok(ApiResponse::success(updated.into()))
}

/// DELETE /job-postings/:id
pub async fn remove(
    State(state): State<AppState>,
    Extension(AuthUser(account)): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
) -> ApiResult<()> {
    state.job_postings.delete(id, &account).await?;
    Ok(ApiResponse::no_content())
}
