use axum::{extract::Request, middleware::Next, response::Response};
use tracing::warn;

use super::auth::AuthUser;
use crate::error::ApiError;
use crate::types::Role;

/// Reject the request unless the authenticated account holds one of `allowed`.
/// Must run after `jwt_auth_middleware`.
async fn require_any(allowed: &[Role], request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(AuthUser(account)) = request.extensions().get::<AuthUser>() else {
        return Err(ApiError::unauthorized("Authentication required"));
    };

    if !allowed.contains(&account.role) {
        warn!(
            "Account {} with role {} denied {} {}",
            account.id,
            account.role,
            request.method(),
            request.uri().path()
        );
        return Err(ApiError::forbidden("Insufficient role for this operation"));
    }

    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    require_any(&[Role::Admin], request, next).await
}

/// EDITOR or ADMIN
pub async fn require_editor(request: Request, next: Next) -> Result<Response, ApiError> {
    require_any(&[Role::Editor, Role::Admin], request, next).await
}

/// Regular members; admins cannot delete their own account
pub async fn require_member(request: Request, next: Next) -> Result<Response, ApiError> {
    require_any(&[Role::User, Role::Editor], request, next).await
}
