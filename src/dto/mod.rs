//! Request payloads and their validation rules

pub mod auth;
pub mod job_posting;
pub mod post;
pub mod taxonomy;
pub mod tea_rating;

pub use auth::{LoginRequest, SignUpRequest};
pub use job_posting::{CreateJobPosting, JobPostingFilter, JobPostingPatch, JobPostingQuery};
pub use post::{CreatePost, PostFilter, PostPatch, PostQuery};
pub use taxonomy::CreateTaxonomyEntry;
pub use tea_rating::{CreateTeaRating, TeaRatingFilter, TeaRatingPatch, TeaRatingQuery};

use std::collections::HashMap;

pub type FieldErrors = HashMap<String, String>;

/// Input validation performed before a payload reaches a service
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// Collects per-field messages; the first message recorded for a field wins
#[derive(Debug, Default)]
pub(crate) struct Checker {
    errors: FieldErrors,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
        self
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if len < min || len > max {
            if min == 1 && len == 0 {
                self.fail(field, "This field is required");
            } else {
                self.fail(field, format!("Must be between {} and {} characters", min, max));
            }
        }
        self
    }

    pub fn opt_length(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) -> &mut Self {
        if let Some(value) = value {
            self.length(field, value, min, max);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_plausible_email(value.trim()) {
            self.fail(field, "Must be a valid email address");
        }
        self
    }

    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.fail(field, message);
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

/// `local@domain.tld` with no whitespace and a single `@`
fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_plausible_email("alice@example.com"));
        assert!(is_plausible_email("a.b+c@mail.example.org"));
        assert!(!is_plausible_email("alice"));
        assert!(!is_plausible_email("alice@localhost"));
        assert!(!is_plausible_email("a@b@c.com"));
        assert!(!is_plausible_email("al ice@example.com"));
        assert!(!is_plausible_email("@example.com"));
    }

    #[test]
    fn checker_keeps_first_message_per_field() {
        let errors = Checker::new()
            .length("name", "", 1, 10)
            .check("name", false, "second")
            .finish()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["name"], "This field is required");
    }
}
