use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::{ServiceError, ServiceResult};
use crate::database::models::{
    Account, AuthorSummary, Content, JobPosting, NewJobPosting, TaxonomyKind,
};
use crate::database::{ContentStore, TaxonomyStore};
use crate::dto::{CreateJobPosting, JobPostingFilter, JobPostingPatch};
use crate::types::{Page, Paged, Role};

/// CRUD with author ownership checks, shared by every content type
pub struct ContentService<T: Content> {
    store: Arc<dyn ContentStore<T>>,
}

impl<T: Content> Clone for ContentService<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: Content> ContentService<T> {
    pub fn new(store: Arc<dyn ContentStore<T>>) -> Self {
        Self { store }
    }

    fn not_found(id: i64) -> ServiceError {
        ServiceError::NotFound(format!("{} {} not found", T::KIND.label(), id))
    }

    pub async fn create(&self, author: &Account, draft: T::Draft) -> ServiceResult<T> {
        let item = self
            .store
            .insert(AuthorSummary::from(author), draft, Utc::now())
            .await?;
        info!("Account {} created {} {}", author.id, T::KIND, item.id());
        Ok(item)
    }

    pub async fn list(&self, filter: &T::Filter, page: Page) -> ServiceResult<Paged<T>> {
        let (items, total) = self.store.list(filter, page).await?;
        Ok(Paged::new(items, total, page))
    }

    /// Public read. Types that count views record one per successful read.
    pub async fn get(&self, id: i64) -> ServiceResult<T> {
        let mut item = self
            .store
            .find(id)
            .await?
            .filter(|item| item.is_listed())
            .ok_or_else(|| Self::not_found(id))?;

        if T::COUNTS_VIEWS {
            // separate write; concurrent readers may lose increments
            self.store.record_view(id).await?;
            item.record_view();
        }
        Ok(item)
    }

    /// Load a live item and require `acting` to be its author
    async fn owned(&self, id: i64, acting: &Account) -> ServiceResult<T> {
        let item = self.store.find(id).await?.ok_or_else(|| Self::not_found(id))?;
        if item.author().id != acting.id {
            warn!("Account {} denied access to {} {}", acting.id, T::KIND, id);
            return Err(ServiceError::Forbidden(format!(
                "Only the author can modify this {}",
                T::KIND.label()
            )));
        }
        Ok(item)
    }

    pub async fn update(&self, id: i64, patch: T::Patch, acting: &Account) -> ServiceResult<T> {
        let mut item = self.owned(id, acting).await?;
        item.apply_patch(patch, Utc::now());
        item.check().map_err(ServiceError::validation)?;

        if !self.store.update(&item).await? {
            return Err(Self::not_found(id));
        }
        Ok(item)
    }

    pub async fn delete(&self, id: i64, acting: &Account) -> ServiceResult<()> {
        self.owned(id, acting).await?;
        self.soft_delete(id).await
    }

    /// Soft delete without the ownership check, for ADMIN accounts only
    pub async fn delete_as_admin(&self, id: i64, admin: &Account) -> ServiceResult<()> {
        if admin.role != Role::Admin {
            warn!("Account {} attempted admin removal of {} {}", admin.id, T::KIND, id);
            return Err(ServiceError::Forbidden("Admin role required".to_string()));
        }
        self.store.find(id).await?.ok_or_else(|| Self::not_found(id))?;
        info!("Admin {} removing {} {}", admin.id, T::KIND, id);
        self.soft_delete(id).await
    }

    async fn soft_delete(&self, id: i64) -> ServiceResult<()> {
        if !self.store.soft_delete(id, Utc::now()).await? {
            return Err(Self::not_found(id));
        }
        info!("Soft deleted {} {}", T::KIND, id);
        Ok(())
    }
}

/// Job postings reference taxonomy entries that must be resolved on create
#[derive(Clone)]
pub struct JobPostingService {
    content: ContentService<JobPosting>,
    taxonomy: Arc<dyn TaxonomyStore>,
}

impl JobPostingService {
    pub fn new(store: Arc<dyn ContentStore<JobPosting>>, taxonomy: Arc<dyn TaxonomyStore>) -> Self {
        Self {
            content: ContentService::new(store),
            taxonomy,
        }
    }

    pub async fn create(&self, author: &Account, posting: CreateJobPosting) -> ServiceResult<JobPosting> {
        let location = self
            .taxonomy
            .find(TaxonomyKind::Location, posting.location_id)
            .await?
            .ok_or_else(|| ServiceError::field("location_id", "Unknown location"))?;
        let employment_type = self
            .taxonomy
            .find(TaxonomyKind::EmploymentType, posting.employment_type_id)
            .await?
            .ok_or_else(|| ServiceError::field("employment_type_id", "Unknown employment type"))?;

        self.content
            .create(
                author,
                NewJobPosting {
                    posting,
                    location,
                    employment_type,
                },
            )
            .await
    }

    pub async fn list(&self, filter: &JobPostingFilter, page: Page) -> ServiceResult<Paged<JobPosting>> {
        self.content.list(filter, page).await
    }

    pub async fn get(&self, id: i64) -> ServiceResult<JobPosting> {
        self.content.get(id).await
    }

    pub async fn update(&self, id: i64, patch: JobPostingPatch, acting: &Account) -> ServiceResult<JobPosting> {
        self.content.update(id, patch, acting).await
    }

    pub async fn delete(&self, id: i64, acting: &Account) -> ServiceResult<()> {
        self.content.delete(id, acting).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{JobPostingStatus, Post, PostStatus, TeaRating};
    use crate::database::Stores;
    use crate::dto::{CreatePost, CreateTeaRating, PostFilter, PostPatch, TeaRatingFilter};
    use crate::types::Lifecycle;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn account(id: i64) -> Account {
        Account {
            id,
            name: format!("user{}", id),
            email: format!("user{}@example.com", id),
            password_hash: String::new(),
            role: Role::Editor,
            created_at: Utc::now(),
            lifecycle: Lifecycle::Active,
        }
    }

    fn post(title: &str) -> CreatePost {
        CreatePost {
            title: title.to_string(),
            detail: "detail".to_string(),
            category: Some("notes".to_string()),
            tags: vec![],
            image_url: None,
            status: None,
        }
    }

    fn job(location_id: i64, employment_type_id: i64) -> CreateJobPosting {
        CreateJobPosting {
            title: "Tea blender".to_string(),
            company_name: "Leafworks".to_string(),
            location_id,
            detail_location: "1 Harbour Rd".to_string(),
            description: "Blend teas".to_string(),
            recruitment_start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            recruitment_end_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            job_title: "Blender".to_string(),
            employment_type_id,
            annual_salary: Decimal::new(4_500_000, 2),
            preferred_skills: vec!["tasting".to_string()],
            tags: vec![],
            contact_info: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_status_and_sets_author() {
        let posts = ContentService::<Post>::new(Stores::in_memory().posts);
        let author = account(1);
        let created = posts.create(&author, post("Sencha")).await.unwrap();

        assert_eq!(created.author.id, 1);
        assert_eq!(created.status, PostStatus::Draft);
        assert_eq!(posts.get(created.id).await.unwrap().title, "Sencha");
    }

    #[tokio::test]
    async fn non_author_update_is_forbidden_and_changes_nothing() {
        let posts = ContentService::<Post>::new(Stores::in_memory().posts);
        let (a, b) = (account(1), account(2));
        let created = posts.create(&a, post("Original")).await.unwrap();

        let patch = PostPatch {
            title: Some("Hijacked".to_string()),
            ..Default::default()
        };
        assert!(matches!(posts.update(created.id, patch, &b).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(posts.delete(created.id, &b).await, Err(ServiceError::Forbidden(_))));
        assert_eq!(posts.get(created.id).await.unwrap().title, "Original");
    }

    #[tokio::test]
    async fn author_update_applies_patch() {
        let posts = ContentService::<Post>::new(Stores::in_memory().posts);
        let a = account(1);
        let created = posts.create(&a, post("Original")).await.unwrap();

        let updated = posts
            .update(
                created.id,
                PostPatch {
                    status: Some(PostStatus::Published),
                    ..Default::default()
                },
                &a,
            )
            .await
            .unwrap();
        assert_eq!(updated.status, PostStatus::Published);
        assert_eq!(updated.title, "Original");
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn soft_deleted_items_disappear_from_reads() {
        let posts = ContentService::<Post>::new(Stores::in_memory().posts);
        let a = account(1);
        let created = posts.create(&a, post("Ephemeral")).await.unwrap();

        posts.delete(created.id, &a).await.unwrap();
        assert!(matches!(posts.get(created.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(posts.delete(created.id, &a).await, Err(ServiceError::NotFound(_))));

        let listed = posts.list(&PostFilter::default(), Page::default()).await.unwrap();
        assert_eq!(listed.total, 0);
    }

    #[tokio::test]
    async fn admin_delete_skips_ownership() {
        let ratings = ContentService::<TeaRating>::new(Stores::in_memory().tea_ratings);
        let author = account(1);
        let admin = Account {
            role: Role::Admin,
            ..account(9)
        };
        let created = ratings
            .create(
                &author,
                CreateTeaRating {
                    rating: 4,
                    location: "Kyoto".to_string(),
                    review: "Bright and grassy".to_string(),
                    status: None,
                },
            )
            .await
            .unwrap();

        ratings.delete_as_admin(created.id, &admin).await.unwrap();
        let listed = ratings.list(&TeaRatingFilter::default(), Page::default()).await.unwrap();
        assert!(listed.items.is_empty());
    }

    #[tokio::test]
    async fn admin_delete_refuses_other_roles() {
        let ratings = ContentService::<TeaRating>::new(Stores::in_memory().tea_ratings);
        let author = account(1);
        let created = ratings
            .create(
                &author,
                CreateTeaRating {
                    rating: 3,
                    location: "Hangzhou".to_string(),
                    review: "Chestnut notes".to_string(),
                    status: None,
                },
            )
            .await
            .unwrap();

        for role in [Role::User, Role::Editor] {
            let caller = Account { role, ..account(2) };
            assert!(matches!(
                ratings.delete_as_admin(created.id, &caller).await,
                Err(ServiceError::Forbidden(_))
            ));
        }
        // the author is refused too without the ADMIN role
        assert!(matches!(
            ratings.delete_as_admin(created.id, &author).await,
            Err(ServiceError::Forbidden(_))
        ));

        let listed = ratings.list(&TeaRatingFilter::default(), Page::default()).await.unwrap();
        assert_eq!(listed.total, 1);
    }

    async fn job_service() -> (JobPostingService, i64, i64) {
        let stores = Stores::in_memory();
        let location = stores.taxonomy.create(TaxonomyKind::Location, "Seoul").await.unwrap();
        let employment = stores
            .taxonomy
            .create(TaxonomyKind::EmploymentType, "Full-time")
            .await
            .unwrap();
        (
            JobPostingService::new(stores.job_postings, stores.taxonomy),
            location.id,
            employment.id,
        )
    }

    #[tokio::test]
    async fn job_posting_reads_count_views() {
        let (jobs, location, employment) = job_service().await;
        let created = jobs.create(&account(1), job(location, employment)).await.unwrap();
        assert_eq!(created.location.name, "Seoul");

        assert_eq!(jobs.get(created.id).await.unwrap().view_count, 1);
        assert_eq!(jobs.get(created.id).await.unwrap().view_count, 2);
    }

    #[tokio::test]
    async fn unknown_taxonomy_reference_is_a_validation_error() {
        let (jobs, location, _) = job_service().await;
        let result = jobs.create(&account(1), job(location, 999)).await;
        match result {
            Err(ServiceError::Validation { field_errors: Some(errors), .. }) => {
                assert!(errors.contains_key("employment_type_id"));
            }
            other => panic!("unexpected result: {:?}", other.map(|p| p.id)),
        }
    }

    #[tokio::test]
    async fn inactive_postings_are_hidden_but_still_editable() {
        let (jobs, location, employment) = job_service().await;
        let author = account(1);
        let mut draft = job(location, employment);
        draft.status = Some(JobPostingStatus::Private);
        let created = jobs.create(&author, draft).await.unwrap();

        assert!(matches!(jobs.get(created.id).await, Err(ServiceError::NotFound(_))));
        let listed = jobs.list(&JobPostingFilter::default(), Page::default()).await.unwrap();
        assert_eq!(listed.total, 0);

        let reopened = jobs
            .update(
                created.id,
                JobPostingPatch {
                    status: Some(JobPostingStatus::Active),
                    ..Default::default()
                },
                &author,
            )
            .await
            .unwrap();
        assert_eq!(reopened.status, JobPostingStatus::Active);
        assert!(jobs.get(created.id).await.is_ok());
    }

    #[tokio::test]
    async fn patch_inverting_recruitment_dates_is_rejected() {
        let (jobs, location, employment) = job_service().await;
        let author = account(1);
        let created = jobs.create(&author, job(location, employment)).await.unwrap();

        let patch = JobPostingPatch {
            recruitment_start_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            ..Default::default()
        };
        assert!(matches!(
            jobs.update(created.id, patch, &author).await,
            Err(ServiceError::Validation { .. })
        ));
    }
}
