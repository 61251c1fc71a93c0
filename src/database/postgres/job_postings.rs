use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

use super::{
    author_summary, increment_views, like_pattern, limit_offset, live_ids_by_author, purge_rows,
    soft_delete_row,
};
use crate::database::models::{
    AuthorSummary, Content, JobPosting, JobPostingStatus, NewJobPosting, TaxonomyEntry,
};
use crate::database::store::{ContentStore, StoreError};
use crate::dto::JobPostingFilter;
use crate::types::{Lifecycle, Page};

const TABLE: &str = "job_postings";

const JOB_POSTING_SELECT: &str = "SELECT t.id, t.author_id, a.name AS author_name, a.email AS author_email, \
     t.title, t.company_name, t.location_id, l.name AS location_name, t.detail_location, t.description, \
     t.recruitment_start_date, t.recruitment_end_date, t.job_title, t.employment_type_id, \
     e.name AS employment_type_name, t.annual_salary, t.preferred_skills, t.tags, t.contact_info, \
     t.status, t.view_count, t.created_at, t.updated_at, t.deleted_at \
     FROM job_postings t \
     JOIN accounts a ON a.id = t.author_id \
     JOIN locations l ON l.id = t.location_id \
     JOIN employment_types e ON e.id = t.employment_type_id";

#[derive(Debug, FromRow)]
struct JobPostingRow {
    id: i64,
    author_id: i64,
    author_name: String,
    author_email: String,
    title: String,
    company_name: String,
    location_id: i64,
    location_name: String,
    detail_location: String,
    description: String,
    recruitment_start_date: NaiveDate,
    recruitment_end_date: NaiveDate,
    job_title: String,
    employment_type_id: i64,
    employment_type_name: String,
    annual_salary: Decimal,
    preferred_skills: Vec<String>,
    tags: Vec<String>,
    contact_info: Option<String>,
    status: String,
    view_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobPostingRow> for JobPosting {
    type Error = StoreError;

    fn try_from(row: JobPostingRow) -> Result<Self, Self::Error> {
        Ok(JobPosting {
            id: row.id,
            author: author_summary(row.author_id, row.author_name, row.author_email),
            title: row.title,
            company_name: row.company_name,
            location: TaxonomyEntry {
                id: row.location_id,
                name: row.location_name,
            },
            detail_location: row.detail_location,
            description: row.description,
            recruitment_start_date: row.recruitment_start_date,
            recruitment_end_date: row.recruitment_end_date,
            job_title: row.job_title,
            employment_type: TaxonomyEntry {
                id: row.employment_type_id,
                name: row.employment_type_name,
            },
            annual_salary: row.annual_salary,
            preferred_skills: row.preferred_skills,
            tags: row.tags,
            contact_info: row.contact_info,
            status: row.status.parse::<JobPostingStatus>().map_err(StoreError::Corrupt)?,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            lifecycle: Lifecycle::from_deleted_at(row.deleted_at),
        })
    }
}

pub struct PgJobPostingStore {
    pool: PgPool,
}

impl PgJobPostingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Live, publicly listed rows matching `filter`
    fn push_conditions(query: &mut QueryBuilder<'_, Postgres>, filter: &JobPostingFilter) {
        query.push(" WHERE t.deleted_at IS NULL AND t.status = ");
        query.push_bind(JobPostingStatus::Active.as_str());

        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            query
                .push(" AND (t.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR t.company_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(location_id) = filter.location_id {
            query.push(" AND t.location_id = ").push_bind(location_id);
        }
        if let Some(employment_type_id) = filter.employment_type_id {
            query.push(" AND t.employment_type_id = ").push_bind(employment_type_id);
        }
        if let Some(min) = filter.min_salary {
            query.push(" AND t.annual_salary >= ").push_bind(min);
        }
        if let Some(max) = filter.max_salary {
            query.push(" AND t.annual_salary <= ").push_bind(max);
        }
    }
}

#[async_trait]
impl ContentStore<JobPosting> for PgJobPostingStore {
    async fn insert(&self, author: AuthorSummary, draft: NewJobPosting, now: DateTime<Utc>) -> Result<JobPosting, StoreError> {
        let now = now.trunc_subsecs(6);
        let posting = &draft.posting;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO job_postings (
                author_id, title, company_name, location_id, detail_location, description,
                recruitment_start_date, recruitment_end_date, job_title, employment_type_id,
                annual_salary, preferred_skills, tags, contact_info, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING id
            "#,
        )
        .bind(author.id)
        .bind(&posting.title)
        .bind(&posting.company_name)
        .bind(draft.location.id)
        .bind(&posting.detail_location)
        .bind(&posting.description)
        .bind(posting.recruitment_start_date)
        .bind(posting.recruitment_end_date)
        .bind(&posting.job_title)
        .bind(draft.employment_type.id)
        .bind(posting.annual_salary)
        .bind(&posting.preferred_skills)
        .bind(&posting.tags)
        .bind(&posting.contact_info)
        .bind(posting.status.unwrap_or_default().as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(JobPosting::from_draft(id, author, draft, now))
    }

    async fn find(&self, id: i64) -> Result<Option<JobPosting>, StoreError> {
        let sql = format!("{} WHERE t.id = $1 AND t.deleted_at IS NULL", JOB_POSTING_SELECT);
        let row: Option<JobPostingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(JobPosting::try_from).transpose()
    }

    async fn list(&self, filter: &JobPostingFilter, page: Page) -> Result<(Vec<JobPosting>, u64), StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM job_postings t");
        Self::push_conditions(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let (limit, offset) = limit_offset(page);
        let mut select = QueryBuilder::<Postgres>::new(JOB_POSTING_SELECT);
        Self::push_conditions(&mut select, filter);
        select
            .push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows: Vec<JobPostingRow> = select.build_query_as().fetch_all(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(JobPosting::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total as u64))
    }

    async fn update(&self, item: &JobPosting) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE job_postings SET
                title = $1, company_name = $2, detail_location = $3, description = $4,
                recruitment_start_date = $5, recruitment_end_date = $6, job_title = $7,
                annual_salary = $8, preferred_skills = $9, tags = $10, contact_info = $11,
                status = $12, updated_at = $13
            WHERE id = $14 AND deleted_at IS NULL
            "#,
        )
        .bind(&item.title)
        .bind(&item.company_name)
        .bind(&item.detail_location)
        .bind(&item.description)
        .bind(item.recruitment_start_date)
        .bind(item.recruitment_end_date)
        .bind(&item.job_title)
        .bind(item.annual_salary)
        .bind(&item.preferred_skills)
        .bind(&item.tags)
        .bind(&item.contact_info)
        .bind(item.status.as_str())
        .bind(item.updated_at)
        .bind(item.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError> {
        soft_delete_row(&self.pool, TABLE, id, at).await
    }

    async fn record_view(&self, id: i64) -> Result<(), StoreError> {
        increment_views(&self.pool, TABLE, id).await
    }

    async fn purge_deleted_before(&self, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
        purge_rows(&self.pool, TABLE, threshold).await
    }

    async fn ids_by_author(&self) -> Result<HashMap<i64, Vec<i64>>, StoreError> {
        live_ids_by_author(&self.pool, TABLE).await
    }
}
