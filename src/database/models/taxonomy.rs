use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lookup lists used to classify job postings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    Location,
    EmploymentType,
}

impl TaxonomyKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaxonomyKind::Location => "location",
            TaxonomyKind::EmploymentType => "employment type",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            TaxonomyKind::Location => "locations",
            TaxonomyKind::EmploymentType => "employment_types",
        }
    }

    /// Column on job_postings that references this taxonomy
    pub fn reference_field(&self) -> &'static str {
        match self {
            TaxonomyKind::Location => "location_id",
            TaxonomyKind::EmploymentType => "employment_type_id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TaxonomyEntry {
    pub id: i64,
    pub name: String,
}
