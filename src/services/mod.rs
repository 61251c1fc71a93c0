pub mod auth_service;
pub mod content_service;
pub mod error;
pub mod retention;
pub mod taxonomy_service;

pub use auth_service::AuthService;
pub use content_service::{ContentService, JobPostingService};
pub use error::{ServiceError, ServiceResult};
pub use retention::{RetentionSweeper, SweepReport};
pub use taxonomy_service::TaxonomyService;
