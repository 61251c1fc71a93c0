use serde::Deserialize;

use super::post::non_blank;
use super::{Checker, FieldErrors, Validate};
use crate::database::models::TeaRatingStatus;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

const RATING_MESSAGE: &str = "Must be between 1 and 5";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeaRating {
    pub rating: i32,
    pub location: String,
    pub review: String,
    pub status: Option<TeaRatingStatus>,
}

impl Validate for CreateTeaRating {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checker::new()
            .check("rating", (MIN_RATING..=MAX_RATING).contains(&self.rating), RATING_MESSAGE)
            .length("location", &self.location, 1, 100)
            .length("review", &self.review, 1, 5_000)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeaRatingPatch {
    pub rating: Option<i32>,
    pub status: Option<TeaRatingStatus>,
    pub location: Option<String>,
    pub review: Option<String>,
}

impl Validate for TeaRatingPatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checker::new()
            .check(
                "rating",
                self.rating.map_or(true, |r| (MIN_RATING..=MAX_RATING).contains(&r)),
                RATING_MESSAGE,
            )
            .opt_length("location", self.location.as_deref(), 1, 100)
            .opt_length("review", self.review.as_deref(), 1, 5_000)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeaRatingFilter {
    pub location: Option<String>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
}

/// GET /tea-ratings query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeaRatingQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub location: Option<String>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
}

impl TeaRatingQuery {
    pub fn filter(&self) -> TeaRatingFilter {
        TeaRatingFilter {
            location: non_blank(&self.location),
            min_rating: self.min_rating,
            max_rating: self.max_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_out_of_range_is_rejected() {
        let create = CreateTeaRating {
            rating: 6,
            location: "Hadong".to_string(),
            review: "Roasty".to_string(),
            status: None,
        };
        assert!(create.validate().unwrap_err().contains_key("rating"));

        let patch = TeaRatingPatch {
            rating: Some(0),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(TeaRatingPatch::default().validate().is_ok());
    }
}
