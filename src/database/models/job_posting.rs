use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{contains_ignore_case, AuthorSummary, Content, ContentKind, TaxonomyEntry};
use crate::dto::{CreateJobPosting, JobPostingFilter, JobPostingPatch};
use crate::types::Lifecycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPostingStatus {
    #[default]
    Active,
    Private,
    Expired,
}

impl JobPostingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPostingStatus::Active => "active",
            JobPostingStatus::Private => "private",
            JobPostingStatus::Expired => "expired",
        }
    }
}

impl FromStr for JobPostingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(JobPostingStatus::Active),
            "private" => Ok(JobPostingStatus::Private),
            "expired" => Ok(JobPostingStatus::Expired),
            other => Err(format!("unknown job posting status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: i64,
    pub author: AuthorSummary,
    pub title: String,
    pub company_name: String,
    pub location: TaxonomyEntry,
    pub detail_location: String,
    pub description: String,
    pub recruitment_start_date: NaiveDate,
    pub recruitment_end_date: NaiveDate,
    pub job_title: String,
    pub employment_type: TaxonomyEntry,
    /// Yearly salary, two decimal places
    pub annual_salary: Decimal,
    pub preferred_skills: Vec<String>,
    pub tags: Vec<String>,
    pub contact_info: Option<String>,
    pub status: JobPostingStatus,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lifecycle: Lifecycle,
}

/// Creation input with its taxonomy references already resolved
#[derive(Debug, Clone)]
pub struct NewJobPosting {
    pub posting: CreateJobPosting,
    pub location: TaxonomyEntry,
    pub employment_type: TaxonomyEntry,
}

impl Content for JobPosting {
    type Draft = NewJobPosting;
    type Patch = JobPostingPatch;
    type Filter = JobPostingFilter;

    const KIND: ContentKind = ContentKind::JobPosting;
    const COUNTS_VIEWS: bool = true;

    fn from_draft(id: i64, author: AuthorSummary, draft: NewJobPosting, now: DateTime<Utc>) -> Self {
        let NewJobPosting {
            posting,
            location,
            employment_type,
        } = draft;
        Self {
            id,
            author,
            title: posting.title,
            company_name: posting.company_name,
            location,
            detail_location: posting.detail_location,
            description: posting.description,
            recruitment_start_date: posting.recruitment_start_date,
            recruitment_end_date: posting.recruitment_end_date,
            job_title: posting.job_title,
            employment_type,
            annual_salary: posting.annual_salary,
            preferred_skills: posting.preferred_skills,
            tags: posting.tags,
            contact_info: posting.contact_info,
            status: posting.status.unwrap_or_default(),
            view_count: 0,
            created_at: now,
            updated_at: now,
            lifecycle: Lifecycle::Active,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn author(&self) -> &AuthorSummary {
        &self.author
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    fn apply_patch(&mut self, patch: JobPostingPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(company_name) = patch.company_name {
            self.company_name = company_name;
        }
        if let Some(detail_location) = patch.detail_location {
            self.detail_location = detail_location;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(start) = patch.recruitment_start_date {
            self.recruitment_start_date = start;
        }
        if let Some(end) = patch.recruitment_end_date {
            self.recruitment_end_date = end;
        }
        if let Some(job_title) = patch.job_title {
            self.job_title = job_title;
        }
        if let Some(annual_salary) = patch.annual_salary {
            self.annual_salary = annual_salary;
        }
        if let Some(preferred_skills) = patch.preferred_skills {
            self.preferred_skills = preferred_skills;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(contact_info) = patch.contact_info {
            self.contact_info = Some(contact_info);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
    }

    fn check(&self) -> Result<(), String> {
        if self.recruitment_end_date < self.recruitment_start_date {
            return Err("recruitment_end_date must not be before recruitment_start_date".to_string());
        }
        Ok(())
    }

    fn is_listed(&self) -> bool {
        self.status == JobPostingStatus::Active
    }

    fn matches(&self, filter: &JobPostingFilter) -> bool {
        let search = filter.search.as_deref().map_or(true, |s| {
            contains_ignore_case(&self.title, s) || contains_ignore_case(&self.company_name, s)
        });
        search
            && filter.location_id.map_or(true, |id| self.location.id == id)
            && filter.employment_type_id.map_or(true, |id| self.employment_type.id == id)
            && filter.min_salary.map_or(true, |min| self.annual_salary >= min)
            && filter.max_salary.map_or(true, |max| self.annual_salary <= max)
    }

    fn record_view(&mut self) {
        self.view_count += 1;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecruitmentPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Presentation shape returned by the job posting endpoints
#[derive(Debug, Clone, Serialize)]
pub struct JobPostingView {
    pub id: i64,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub detail_location: String,
    pub description: String,
    pub recruitment_period: RecruitmentPeriod,
    pub job_title: String,
    pub employment_type: String,
    pub salary: Decimal,
    pub preferred_skills: Vec<String>,
    pub tags: Vec<String>,
    pub contact_info: Option<String>,
    pub views: i64,
    pub status: JobPostingStatus,
    pub author: AuthorSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobPosting> for JobPostingView {
    fn from(posting: JobPosting) -> Self {
        Self {
            id: posting.id,
            title: posting.title,
            company_name: posting.company_name,
            location: posting.location.name,
            detail_location: posting.detail_location,
            description: posting.description,
            recruitment_period: RecruitmentPeriod {
                start: posting.recruitment_start_date,
                end: posting.recruitment_end_date,
            },
            job_title: posting.job_title,
            employment_type: posting.employment_type.name,
            salary: posting.annual_salary,
            preferred_skills: posting.preferred_skills,
            tags: posting.tags,
            contact_info: posting.contact_info,
            views: posting.view_count,
            status: posting.status,
            author: posting.author,
            created_at: posting.created_at,
            updated_at: posting.updated_at,
        }
    }
}
