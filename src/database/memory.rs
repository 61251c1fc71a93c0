//! In-process store implementations backing tests and local demos

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{
    Account, AuthorSummary, Content, JobPosting, NewAccount, TaxonomyEntry, TaxonomyKind,
};
use super::store::{AccountStore, ContentStore, StoreError, TaxonomyStore};
use crate::types::{Lifecycle, Page, Role};

#[derive(Default)]
pub struct MemoryAccountStore {
    rows: RwLock<BTreeMap<i64, Account>>,
    next_id: AtomicI64,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut rows = self.rows.write().await;
        for existing in rows.values().filter(|a| a.is_active()) {
            if existing.email == account.email {
                return Err(StoreError::Duplicate("email".to_string()));
            }
            if existing.name == account.name {
                return Err(StoreError::Duplicate("name".to_string()));
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Account {
            id,
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            created_at: Utc::now(),
            lifecycle: Lifecycle::Active,
        };
        rows.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|a| a.is_active() && a.email == email).cloned())
    }

    async fn find_active_by_name(&self, name: &str) -> Result<Option<Account>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|a| a.is_active() && a.name == name).cloned())
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(account) => {
                account.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_deleted(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(account) if account.is_active() => {
                account.lifecycle = Lifecycle::SoftDeleted { at };
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct MemoryContentStore<T> {
    rows: RwLock<BTreeMap<i64, T>>,
    next_id: AtomicI64,
}

impl<T: Content> MemoryContentStore<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(0),
        }
    }

    /// Raw lookup including soft-deleted rows
    #[cfg(test)]
    pub async fn get_any(&self, id: i64) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }
}

impl<T: Content> Default for MemoryContentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContentStore<JobPosting> {
    /// Soft-deleted postings still hold their references until purged
    async fn references(&self, kind: TaxonomyKind, id: i64) -> bool {
        self.rows.read().await.values().any(|posting| match kind {
            TaxonomyKind::Location => posting.location.id == id,
            TaxonomyKind::EmploymentType => posting.employment_type.id == id,
        })
    }
}

#[async_trait]
impl<T: Content> ContentStore<T> for MemoryContentStore<T> {
    async fn insert(&self, author: AuthorSummary, draft: T::Draft, now: DateTime<Utc>) -> Result<T, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let item = T::from_draft(id, author, draft, now);
        self.rows.write().await.insert(id, item.clone());
        Ok(item)
    }

    async fn find(&self, id: i64) -> Result<Option<T>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|item| item.lifecycle().is_active()).cloned())
    }

    async fn list(&self, filter: &T::Filter, page: Page) -> Result<(Vec<T>, u64), StoreError> {
        let rows = self.rows.read().await;
        let mut matching: Vec<&T> = rows
            .values()
            .filter(|item| item.lifecycle().is_active() && item.is_listed() && item.matches(filter))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn update(&self, item: &T) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&item.id()) {
            Some(stored) if stored.lifecycle().is_active() => {
                *stored = item.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(item) if item.lifecycle().is_active() => {
                item.set_lifecycle(Lifecycle::SoftDeleted { at });
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_view(&self, id: i64) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if let Some(item) = rows.get_mut(&id).filter(|item| item.lifecycle().is_active()) {
            item.record_view();
        }
        Ok(())
    }

    async fn purge_deleted_before(&self, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, item| !item.lifecycle().is_purgeable(threshold));
        Ok((before - rows.len()) as u64)
    }

    async fn ids_by_author(&self) -> Result<HashMap<i64, Vec<i64>>, StoreError> {
        let rows = self.rows.read().await;
        let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
        for item in rows.values().filter(|item| item.lifecycle().is_active()) {
            grouped.entry(item.author().id).or_default().push(item.id());
        }
        Ok(grouped)
    }
}

pub struct MemoryTaxonomyStore {
    entries: RwLock<HashMap<TaxonomyKind, BTreeMap<i64, TaxonomyEntry>>>,
    next_id: AtomicI64,
    job_postings: Arc<MemoryContentStore<JobPosting>>,
}

impl MemoryTaxonomyStore {
    pub fn new(job_postings: Arc<MemoryContentStore<JobPosting>>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(0),
            job_postings,
        }
    }
}

#[async_trait]
impl TaxonomyStore for MemoryTaxonomyStore {
    async fn create(&self, kind: TaxonomyKind, name: &str) -> Result<TaxonomyEntry, StoreError> {
        let mut entries = self.entries.write().await;
        let table = entries.entry(kind).or_default();
        if table.values().any(|e| e.name == name) {
            return Err(StoreError::Duplicate("name".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = TaxonomyEntry {
            id,
            name: name.to_string(),
        };
        table.insert(id, entry.clone());
        Ok(entry)
    }

    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyEntry>, StoreError> {
        let entries = self.entries.read().await;
        let mut listed: Vec<TaxonomyEntry> = entries
            .get(&kind)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn find(&self, kind: TaxonomyKind, id: i64) -> Result<Option<TaxonomyEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&kind).and_then(|table| table.get(&id)).cloned())
    }

    async fn delete(&self, kind: TaxonomyKind, id: i64) -> Result<bool, StoreError> {
        if self.job_postings.references(kind, id).await {
            return Err(StoreError::InUse(kind.label().to_string()));
        }
        let mut entries = self.entries.write().await;
        Ok(entries
            .get_mut(&kind)
            .map_or(false, |table| table.remove(&id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Post;
    use crate::dto::{CreatePost, PostFilter};
    use chrono::Duration;

    fn author(id: i64) -> AuthorSummary {
        AuthorSummary {
            id,
            name: format!("author{}", id),
            email: format!("author{}@example.com", id),
        }
    }

    fn draft(title: &str) -> CreatePost {
        CreatePost {
            title: title.to_string(),
            detail: "body".to_string(),
            category: None,
            tags: vec![],
            image_url: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_among_active_accounts() {
        let store = MemoryAccountStore::new();
        let new = |name: &str| NewAccount {
            name: name.to_string(),
            email: "dup@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        };

        let first = store.insert(new("first")).await.unwrap();
        assert!(matches!(store.insert(new("second")).await, Err(StoreError::Duplicate(f)) if f == "email"));

        store.mark_deleted(first.id, Utc::now()).await.unwrap();
        assert!(store.insert(new("second")).await.is_ok());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paginated() {
        let store = MemoryContentStore::<Post>::new();
        let start = Utc::now();
        for i in 0..5 {
            store
                .insert(author(1), draft(&format!("post {}", i)), start + Duration::seconds(i))
                .await
                .unwrap();
        }

        let (items, total) = store
            .list(&PostFilter::default(), Page { page: 2, limit: 2 })
            .await
            .unwrap();
        assert_eq!(total, 5);
        let titles: Vec<_> = items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["post 2", "post 1"]);
    }

    #[tokio::test]
    async fn soft_deleted_rows_are_hidden_and_purgeable() {
        let store = MemoryContentStore::<Post>::new();
        let now = Utc::now();
        let post = store.insert(author(1), draft("gone"), now).await.unwrap();

        assert!(store.soft_delete(post.id, now).await.unwrap());
        assert!(!store.soft_delete(post.id, now).await.unwrap());
        assert!(store.find(post.id).await.unwrap().is_none());
        assert!(store.get_any(post.id).await.is_some());

        assert_eq!(store.purge_deleted_before(now).await.unwrap(), 0);
        assert_eq!(store.purge_deleted_before(now + Duration::seconds(1)).await.unwrap(), 1);
        assert!(store.get_any(post.id).await.is_none());
    }
}
