pub mod auth;
pub mod response;
pub mod roles;
pub mod validate;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use roles::{require_admin, require_editor, require_member};
pub use validate::{ValidJson, ValidPath, ValidQuery};
