use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{contains_ignore_case, AuthorSummary, Content, ContentKind};
use crate::dto::{CreateTeaRating, TeaRatingFilter, TeaRatingPatch};
use crate::types::Lifecycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeaRatingStatus {
    #[default]
    Active,
    Private,
}

impl TeaRatingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeaRatingStatus::Active => "active",
            TeaRatingStatus::Private => "private",
        }
    }
}

impl FromStr for TeaRatingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TeaRatingStatus::Active),
            "private" => Ok(TeaRatingStatus::Private),
            other => Err(format!("unknown tea rating status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeaRating {
    pub id: i64,
    pub author: AuthorSummary,
    pub rating: i32,
    pub status: TeaRatingStatus,
    /// Where the tea was tasted
    pub location: String,
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lifecycle: Lifecycle,
}

impl Content for TeaRating {
    type Draft = CreateTeaRating;
    type Patch = TeaRatingPatch;
    type Filter = TeaRatingFilter;

    const KIND: ContentKind = ContentKind::TeaRating;

    fn from_draft(id: i64, author: AuthorSummary, draft: CreateTeaRating, now: DateTime<Utc>) -> Self {
        Self {
            id,
            author,
            rating: draft.rating,
            status: draft.status.unwrap_or_default(),
            location: draft.location,
            review: draft.review,
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

    fn apply_patch(&mut self, patch: TeaRatingPatch, now: DateTime<Utc>) {
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(review) = patch.review {
            self.review = review;
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &TeaRatingFilter) -> bool {
        filter
            .location
            .as_deref()
            .map_or(true, |l| contains_ignore_case(&self.location, l))
            && filter.min_rating.map_or(true, |min| self.rating >= min)
            && filter.max_rating.map_or(true, |max| self.rating <= max)
    }
}
