use serde::Deserialize;

use super::{Checker, FieldErrors, Validate};

/// POST /auth/signup body. Accounts created through the API always start as USER.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub password: String,
    pub email: String,
}

impl Validate for SignUpRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checker::new()
            .length("name", &self.name, 1, 50)
            .check(
                "password",
                (6..=20).contains(&self.password.chars().count()),
                "Must be between 6 and 20 characters",
            )
            .email("email", &self.email)
            .finish()
    }
}

/// POST /auth/login body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checker::new()
            .email("email", &self.email)
            .check("password", !self.password.is_empty(), "This field is required")
            .finish()
    }
}
