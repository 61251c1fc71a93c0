use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::post::non_blank;
use super::{Checker, FieldErrors, Validate};
use crate::database::models::JobPostingStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobPosting {
    pub title: String,
    pub company_name: String,
    pub location_id: i64,
    pub detail_location: String,
    pub description: String,
    pub recruitment_start_date: NaiveDate,
    pub recruitment_end_date: NaiveDate,
    pub job_title: String,
    pub employment_type_id: i64,
    pub annual_salary: Decimal,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub contact_info: Option<String>,
    pub status: Option<JobPostingStatus>,
}

impl Validate for CreateJobPosting {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checker::new()
            .length("title", &self.title, 1, 100)
            .length("company_name", &self.company_name, 1, 100)
            .check("location_id", self.location_id > 0, "Must be a positive id")
            .length("detail_location", &self.detail_location, 1, 255)
            .length("description", &self.description, 1, 20_000)
            .check(
                "recruitment_end_date",
                self.recruitment_end_date >= self.recruitment_start_date,
                "Must not be before recruitment_start_date",
            )
            .length("job_title", &self.job_title, 1, 50)
            .check("employment_type_id", self.employment_type_id > 0, "Must be a positive id")
            .check("annual_salary", valid_salary(self.annual_salary), SALARY_MESSAGE)
            .opt_length("contact_info", self.contact_info.as_deref(), 1, 50)
            .finish()
    }
}

const SALARY_MESSAGE: &str = "Must be positive with at most 2 decimal places";

/// Positive and fits NUMERIC(10, 2)
fn valid_salary(salary: Decimal) -> bool {
    salary > Decimal::ZERO && salary.normalize().scale() <= 2 && salary < Decimal::from(100_000_000)
}

/// Fields an author may change. Author, counters, taxonomy references and timestamps are not
/// part of the patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPostingPatch {
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub detail_location: Option<String>,
    pub description: Option<String>,
    pub recruitment_start_date: Option<NaiveDate>,
    pub recruitment_end_date: Option<NaiveDate>,
    pub job_title: Option<String>,
    pub annual_salary: Option<Decimal>,
    pub preferred_skills: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub contact_info: Option<String>,
    pub status: Option<JobPostingStatus>,
}

impl Validate for JobPostingPatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        let dates_ordered = match (self.recruitment_start_date, self.recruitment_end_date) {
            (Some(start), Some(end)) => end >= start,
            _ => true,
        };
        Checker::new()
            .opt_length("title", self.title.as_deref(), 1, 100)
            .opt_length("company_name", self.company_name.as_deref(), 1, 100)
            .opt_length("detail_location", self.detail_location.as_deref(), 1, 255)
            .opt_length("description", self.description.as_deref(), 1, 20_000)
            .check("recruitment_end_date", dates_ordered, "Must not be before recruitment_start_date")
            .opt_length("job_title", self.job_title.as_deref(), 1, 50)
            .check("annual_salary", self.annual_salary.map_or(true, valid_salary), SALARY_MESSAGE)
            .opt_length("contact_info", self.contact_info.as_deref(), 1, 50)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobPostingFilter {
    /// Matches title or company name
    pub search: Option<String>,
    pub location_id: Option<i64>,
    pub employment_type_id: Option<i64>,
    pub min_salary: Option<Decimal>,
    pub max_salary: Option<Decimal>,
}

/// GET /job-postings query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPostingQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub location_id: Option<i64>,
    pub employment_type_id: Option<i64>,
    pub min_salary: Option<Decimal>,
    pub max_salary: Option<Decimal>,
}

impl JobPostingQuery {
    pub fn filter(&self) -> JobPostingFilter {
        JobPostingFilter {
            search: non_blank(&self.search),
            location_id: self.location_id,
            employment_type_id: self.employment_type_id,
            min_salary: self.min_salary,
            max_salary: self.max_salary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "title": "Tea sommelier",
            "company_name": "Leafworks",
            "location_id": 1,
            "detail_location": "12 Market St",
            "description": "Taste and grade teas",
            "recruitment_start_date": "2024-03-01",
            "recruitment_end_date": "2024-04-01",
            "job_title": "Sommelier",
            "employment_type_id": 2,
            "annual_salary": 4200.50
        })
    }

    #[test]
    fn valid_payload_passes() {
        let create: CreateJobPosting = serde_json::from_value(payload()).unwrap();
        assert!(create.validate().is_ok());
        assert!(create.preferred_skills.is_empty());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut body = payload();
        body["recruitment_end_date"] = json!("2024-02-01");
        let create: CreateJobPosting = serde_json::from_value(body).unwrap();
        let errors = create.validate().unwrap_err();
        assert!(errors.contains_key("recruitment_end_date"));
    }

    #[test]
    fn salary_must_be_positive_with_two_decimals() {
        assert!(valid_salary(Decimal::new(420050, 2)));
        assert!(!valid_salary(Decimal::ZERO));
        assert!(!valid_salary(Decimal::new(-1, 0)));
        assert!(!valid_salary(Decimal::new(12345, 3)));
    }
}
