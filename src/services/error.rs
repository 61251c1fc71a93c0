use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::auth::JwtError;
use crate::database::StoreError;
use crate::dto::FieldErrors;

/// Domain failures raised by the services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Option<FieldErrors>,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.to_string(), message.into());
        ServiceError::Validation {
            message: "Validation failed".to_string(),
            field_errors: Some(field_errors),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
