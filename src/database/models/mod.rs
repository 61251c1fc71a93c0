pub mod account;
pub mod article;
pub mod job_posting;
pub mod taxonomy;
pub mod tea_rating;

pub use account::{Account, AccountWithContent, NewAccount};
pub use article::{Magazine, Post, PostStatus};
pub use job_posting::{JobPosting, JobPostingStatus, JobPostingView, NewJobPosting};
pub use taxonomy::{TaxonomyEntry, TaxonomyKind};
pub use tea_rating::{TeaRating, TeaRatingStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Lifecycle;

/// Author reference embedded in every content record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&Account> for AuthorSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Post,
    JobPosting,
    Magazine,
    TeaRating,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Post,
        ContentKind::JobPosting,
        ContentKind::Magazine,
        ContentKind::TeaRating,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::JobPosting => "job posting",
            ContentKind::Magazine => "magazine",
            ContentKind::TeaRating => "tea rating",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::Post => "posts",
            ContentKind::JobPosting => "job_postings",
            ContentKind::Magazine => "magazines",
            ContentKind::TeaRating => "tea_ratings",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A content record owned by an author, with soft-delete lifecycle.
///
/// `Draft` is the validated creation input, `Patch` the allow-listed update and `Filter` the
/// type-specific listing criteria. Stores and `ContentService` are generic over this trait.
pub trait Content: Clone + Serialize + Send + Sync + 'static {
    type Draft: Send + Sync + 'static;
    type Patch: Send + Sync + 'static;
    type Filter: Default + Send + Sync + 'static;

    const KIND: ContentKind;

    /// Whether a successful public read counts as a view
    const COUNTS_VIEWS: bool = false;

    fn from_draft(id: i64, author: AuthorSummary, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn id(&self) -> i64;

    fn author(&self) -> &AuthorSummary;

    fn created_at(&self) -> DateTime<Utc>;

    fn lifecycle(&self) -> Lifecycle;

    fn set_lifecycle(&mut self, lifecycle: Lifecycle);

    /// Apply only the allow-listed fields of `patch`
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    /// Cross-field rules that must hold after a patch
    fn check(&self) -> Result<(), String> {
        Ok(())
    }

    /// Visible through public list/get
    fn is_listed(&self) -> bool {
        true
    }

    fn matches(&self, filter: &Self::Filter) -> bool;

    fn record_view(&mut self) {}
}

/// Case-insensitive substring test used by in-memory filtering
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
