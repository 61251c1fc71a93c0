// handlers/taxonomy.rs - /locations and /employment-types
//
// The router attaches the `TaxonomyKind` as an extension, so one set of handlers serves both.

use axum::extract::State;
use axum::Extension;

use crate::app::AppState;
use crate::database::models::{TaxonomyEntry, TaxonomyKind};
use crate::dto::CreateTaxonomyEntry;
use crate::middleware::{ApiResponse, ApiResult, ValidJson, ValidPath};

pub async fn list(State(state): State<AppState>, Extension(kind): Extension<TaxonomyKind>) -> ApiResult<Vec<TaxonomyEntry>> {
    Ok(ApiResponse::success(state.taxonomy.list(kind).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<TaxonomyKind>,
    ValidJson(entry): ValidJson<CreateTaxonomyEntry>,
) -> ApiResult<TaxonomyEntry> {
    Ok(ApiResponse::created(state.taxonomy.create(kind, &entry.name).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(kind): Extension<TaxonomyKind>,
    ValidPath(id): ValidPath<i64>,
) -> ApiResult<()> {
    state.taxonomy.delete(kind, id).await?;
    Ok(ApiResponse::no_content())
}
