//! Payloads shared by posts and magazines

use serde::Deserialize;

use super::{Checker, FieldErrors, Validate};
use crate::database::models::PostStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub detail: String,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub status: Option<PostStatus>,
}

impl Validate for CreatePost {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checker::new()
            .length("title", &self.title, 1, 200)
            .length("detail", &self.detail, 1, 50_000)
            .opt_length("category", self.category.as_deref(), 1, 50)
            .check("tags", self.tags.iter().all(|t| !t.trim().is_empty()), "Tags must not be blank")
            .opt_length("image_url", self.image_url.as_deref(), 1, 2048)
            .finish()
    }
}

/// Fields an author may change. Anything else in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub status: Option<PostStatus>,
}

impl Validate for PostPatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checker::new()
            .opt_length("title", self.title.as_deref(), 1, 200)
            .opt_length("detail", self.detail.as_deref(), 1, 50_000)
            .opt_length("category", self.category.as_deref(), 1, 50)
            .check(
                "tags",
                self.tags.iter().flatten().all(|t| !t.trim().is_empty()),
                "Tags must not be blank",
            )
            .opt_length("image_url", self.image_url.as_deref(), 1, 2048)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// GET /posts and GET /magazines query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl PostQuery {
    pub fn filter(&self) -> PostFilter {
        PostFilter {
            search: non_blank(&self.search),
            category: non_blank(&self.category),
        }
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
