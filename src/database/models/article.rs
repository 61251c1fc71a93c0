use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{contains_ignore_case, AuthorSummary, Content, ContentKind};
use crate::dto::{CreatePost, PostFilter, PostPatch};
use crate::types::Lifecycle;

/// Publication state shared by posts and magazines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Private,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Private => "private",
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "private" => Ok(PostStatus::Private),
            other => Err(format!("unknown post status '{}'", other)),
        }
    }
}

/// Posts and magazines share one record layout and payloads; each is stored in its own table
macro_rules! article_model {
    ($(#[$meta:meta])* $ty:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub struct $ty {
            pub id: i64,
            pub author: AuthorSummary,
            pub title: String,
            pub detail: String,
            pub category: Option<String>,
            pub tags: Vec<String>,
            pub image_url: Option<String>,
            pub status: PostStatus,
            pub like_count: i64,
            pub view_count: i64,
            pub created_at: DateTime<Utc>,
            pub updated_at: DateTime<Utc>,
            pub lifecycle: Lifecycle,
        }

        impl Content for $ty {
            type Draft = CreatePost;
            type Patch = PostPatch;
            type Filter = PostFilter;

            const KIND: ContentKind = $kind;

            fn from_draft(id: i64, author: AuthorSummary, draft: CreatePost, now: DateTime<Utc>) -> Self {
                Self {
                    id,
                    author,
                    title: draft.title,
                    detail: draft.detail,
                    category: draft.category,
                    tags: draft.tags,
                    image_url: draft.image_url,
                    status: draft.status.unwrap_or_default(),
                    like_count: 0,
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

            fn apply_patch(&mut self, patch: PostPatch, now: DateTime<Utc>) {
                if let Some(title) = patch.title {
                    self.title = title;
                }
                if let Some(detail) = patch.detail {
                    self.detail = detail;
                }
                if let Some(category) = patch.category {
                    self.category = Some(category);
                }
                if let Some(tags) = patch.tags {
                    self.tags = tags;
                }
                if let Some(image_url) = patch.image_url {
                    self.image_url = Some(image_url);
                }
                if let Some(status) = patch.status {
                    self.status = status;
                }
                self.updated_at = now;
            }

            fn matches(&self, filter: &PostFilter) -> bool {
                filter.search.as_deref().map_or(true, |s| contains_ignore_case(&self.title, s))
                    && filter
                        .category
                        .as_deref()
                        .map_or(true, |c| self.category.as_deref() == Some(c))
            }
        }
    };
}

article_model!(
    /// Community post, writable by any signed-in account
    Post,
    ContentKind::Post
);

article_model!(
    /// Editorial article, writable by editors and admins
    Magazine,
    ContentKind::Magazine
);
