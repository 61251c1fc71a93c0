// handlers/system.rs - service descriptor and health probe

use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - service descriptor
pub async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "endpoints": {
            "auth": "/auth/signup, /auth/login (public); /auth/profile, /auth/account, /auth/users (protected)",
            "posts": "/posts[/:id]",
            "magazines": "/magazines[/:id] (writes: EDITOR)",
            "tea_ratings": "/tea-ratings[/:id] (writes: EDITOR), /tea-ratings/:id/admin (ADMIN)",
            "job_postings": "/job-postings[/:id] (create: EDITOR)",
            "taxonomies": "/locations, /employment-types (writes: ADMIN)",
            "health": "/health",
        }
    })))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(e) = state.stores.accounts.ping().await {
        tracing::warn!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
