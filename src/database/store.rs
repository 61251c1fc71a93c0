use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::memory::{MemoryAccountStore, MemoryContentStore, MemoryTaxonomyStore};
use super::models::{
    Account, AuthorSummary, Content, ContentKind, JobPosting, Magazine, NewAccount, Post,
    TaxonomyEntry, TaxonomyKind, TeaRating,
};
use super::postgres::{
    PgAccountStore, PgArticleStore, PgJobPostingStore, PgTaxonomyStore, PgTeaRatingStore,
};
use crate::types::{Page, Role};

/// Errors raised by the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// A unique constraint rejected the write; carries the offending field
    #[error("Duplicate value for {0}")]
    Duplicate(String),

    /// A delete was blocked by rows that still reference the target
    #[error("{0} is still referenced")]
    InUse(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Account records
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Look up by id regardless of lifecycle
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, StoreError>;

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_active_by_name(&self, name: &str) -> Result<Option<Account>, StoreError>;

    /// Returns false when no account has this id
    async fn update_role(&self, id: i64, role: Role) -> Result<bool, StoreError>;

    /// Returns false when the account is missing or already deleted
    async fn mark_deleted(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Every account, oldest first
    async fn list(&self) -> Result<Vec<Account>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Storage for one content type.
///
/// Reads never return soft-deleted rows. `list` additionally hides rows that are not publicly
/// listed (see [`Content::is_listed`]).
#[async_trait]
pub trait ContentStore<T: Content>: Send + Sync {
    async fn insert(&self, author: AuthorSummary, draft: T::Draft, now: DateTime<Utc>) -> Result<T, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<T>, StoreError>;

    /// Newest first; returns the page plus the total number of matches
    async fn list(&self, filter: &T::Filter, page: Page) -> Result<(Vec<T>, u64), StoreError>;

    /// Persist the mutable fields of `item`. Returns false when the row is gone or deleted.
    async fn update(&self, item: &T) -> Result<bool, StoreError>;

    /// Returns false when the row is missing or already deleted
    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Bump the view counter in its own write
    async fn record_view(&self, id: i64) -> Result<(), StoreError>;

    /// Physically remove rows soft deleted strictly before `threshold`
    async fn purge_deleted_before(&self, threshold: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Ids of live rows grouped by author id
    async fn ids_by_author(&self) -> Result<HashMap<i64, Vec<i64>>, StoreError>;
}

/// Location and employment-type lookup lists
#[async_trait]
pub trait TaxonomyStore: Send + Sync {
    async fn create(&self, kind: TaxonomyKind, name: &str) -> Result<TaxonomyEntry, StoreError>;

    /// Ordered by name
    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyEntry>, StoreError>;

    async fn find(&self, kind: TaxonomyKind, id: i64) -> Result<Option<TaxonomyEntry>, StoreError>;

    /// Fails with `InUse` while a job posting references the entry
    async fn delete(&self, kind: TaxonomyKind, id: i64) -> Result<bool, StoreError>;
}

/// Every store the services need, behind trait objects
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub posts: Arc<dyn ContentStore<Post>>,
    pub magazines: Arc<dyn ContentStore<Magazine>>,
    pub job_postings: Arc<dyn ContentStore<JobPosting>>,
    pub tea_ratings: Arc<dyn ContentStore<TeaRating>>,
    pub taxonomy: Arc<dyn TaxonomyStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            accounts: Arc::new(PgAccountStore::new(pool.clone())),
            posts: Arc::new(PgArticleStore::<Post>::new(pool.clone())),
            magazines: Arc::new(PgArticleStore::<Magazine>::new(pool.clone())),
            job_postings: Arc::new(PgJobPostingStore::new(pool.clone())),
            tea_ratings: Arc::new(PgTeaRatingStore::new(pool.clone())),
            taxonomy: Arc::new(PgTaxonomyStore::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let job_postings = Arc::new(MemoryContentStore::<JobPosting>::new());
        Self {
            accounts: Arc::new(MemoryAccountStore::new()),
            posts: Arc::new(MemoryContentStore::<Post>::new()),
            magazines: Arc::new(MemoryContentStore::<Magazine>::new()),
            taxonomy: Arc::new(MemoryTaxonomyStore::new(job_postings.clone())),
            job_postings,
            tea_ratings: Arc::new(MemoryContentStore::<TeaRating>::new()),
        }
    }

    pub async fn purge_deleted_before(&self, kind: ContentKind, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
        match kind {
            ContentKind::Post => self.posts.purge_deleted_before(threshold).await,
            ContentKind::JobPosting => self.job_postings.purge_deleted_before(threshold).await,
            ContentKind::Magazine => self.magazines.purge_deleted_before(threshold).await,
            ContentKind::TeaRating => self.tea_ratings.purge_deleted_before(threshold).await,
        }
    }
}
