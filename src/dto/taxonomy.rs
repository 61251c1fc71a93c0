use serde::Deserialize;

use super::{Checker, FieldErrors, Validate};

/// POST /locations and POST /employment-types body
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaxonomyEntry {
    pub name: String,
}

impl Validate for CreateTaxonomyEntry {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checker::new().length("name", &self.name, 1, 50).finish()
    }
}
