//! Posts and magazines share one row layout, stored in separate tables

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::marker::PhantomData;

use super::{
    author_summary, increment_views, like_pattern, limit_offset, live_ids_by_author, purge_rows,
    soft_delete_row,
};
use crate::database::models::{AuthorSummary, Content, Magazine, Post, PostStatus};
use crate::database::store::{ContentStore, StoreError};
use crate::dto::{CreatePost, PostFilter, PostPatch};
use crate::types::{Lifecycle, Page};

const ARTICLE_SELECT: &str = "SELECT t.id, t.author_id, a.name AS author_name, a.email AS author_email, \
     t.title, t.detail, t.category, t.tags, t.image_url, t.status, t.like_count, t.view_count, \
     t.created_at, t.updated_at, t.deleted_at";

#[derive(Debug, FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub author_email: String,
    pub title: String,
    pub detail: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub like_count: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Content types stored with the article layout
pub trait Article: Content<Draft = CreatePost, Patch = PostPatch, Filter = PostFilter> {
    fn from_row(row: ArticleRow) -> Result<Self, StoreError>;

    fn title(&self) -> &str;
    fn detail(&self) -> &str;
    fn category(&self) -> Option<&str>;
    fn tags(&self) -> &[String];
    fn image_url(&self) -> Option<&str>;
    fn status(&self) -> PostStatus;
    fn updated_at(&self) -> DateTime<Utc>;
}

macro_rules! impl_article {
    ($ty:ident) => {
        impl Article for $ty {
            fn from_row(row: ArticleRow) -> Result<Self, StoreError> {
                Ok($ty {
                    id: row.id,
                    author: author_summary(row.author_id, row.author_name, row.author_email),
                    title: row.title,
                    detail: row.detail,
                    category: row.category,
                    tags: row.tags,
                    image_url: row.image_url,
                    status: row.status.parse().map_err(StoreError::Corrupt)?,
                    like_count: row.like_count,
                    view_count: row.view_count,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    lifecycle: Lifecycle::from_deleted_at(row.deleted_at),
                })
            }

            fn title(&self) -> &str {
                &self.title
            }

            fn detail(&self) -> &str {
                &self.detail
            }

            fn category(&self) -> Option<&str> {
                self.category.as_deref()
            }

            fn tags(&self) -> &[String] {
                &self.tags
            }

            fn image_url(&self) -> Option<&str> {
                self.image_url.as_deref()
            }

            fn status(&self) -> PostStatus {
                self.status
            }

            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }
        }
    };
}

impl_article!(Post);
impl_article!(Magazine);

pub struct PgArticleStore<T> {
    pool: PgPool,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Article> PgArticleStore<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: PhantomData,
        }
    }

    fn table() -> &'static str {
        T::KIND.table()
    }

    fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
        if let Some(search) = &filter.search {
            query.push(" AND t.title ILIKE ").push_bind(like_pattern(search));
        }
        if let Some(category) = &filter.category {
            query.push(" AND t.category = ").push_bind(category.clone());
        }
    }
}

#[async_trait]
impl<T: Article> ContentStore<T> for PgArticleStore<T> {
    async fn insert(&self, author: AuthorSummary, draft: CreatePost, now: DateTime<Utc>) -> Result<T, StoreError> {
        let now = now.trunc_subsecs(6);
        let sql = format!(
            "INSERT INTO {} (author_id, title, detail, category, tags, image_url, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING id",
            Self::table()
        );
        let id: i64 = sqlx::query_scalar(&sql)
            .bind(author.id)
            .bind(&draft.title)
            .bind(&draft.detail)
            .bind(&draft.category)
            .bind(&draft.tags)
            .bind(&draft.image_url)
            .bind(draft.status.unwrap_or_default().as_str())
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(T::from_draft(id, author, draft, now))
    }

    async fn find(&self, id: i64) -> Result<Option<T>, StoreError> {
        let sql = format!(
            "{} FROM {} t JOIN accounts a ON a.id = t.author_id WHERE t.id = $1 AND t.deleted_at IS NULL",
            ARTICLE_SELECT,
            Self::table()
        );
        let row: Option<ArticleRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(T::from_row).transpose()
    }

    async fn list(&self, filter: &PostFilter, page: Page) -> Result<(Vec<T>, u64), StoreError> {
        let mut count = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) FROM {} t WHERE t.deleted_at IS NULL",
            Self::table()
        ));
        Self::push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let (limit, offset) = limit_offset(page);
        let mut select = QueryBuilder::<Postgres>::new(format!(
            "{} FROM {} t JOIN accounts a ON a.id = t.author_id WHERE t.deleted_at IS NULL",
            ARTICLE_SELECT,
            Self::table()
        ));
        Self::push_filter(&mut select, filter);
        select
            .push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows: Vec<ArticleRow> = select.build_query_as().fetch_all(&self.pool).await?;

        let items = rows.into_iter().map(T::from_row).collect::<Result<Vec<_>, _>>()?;
        Ok((items, total as u64))
    }

    async fn update(&self, item: &T) -> Result<bool, StoreError> {
        let sql = format!(
            "UPDATE {} SET title = $1, detail = $2, category = $3, tags = $4, image_url = $5, \
             status = $6, updated_at = $7 WHERE id = $8 AND deleted_at IS NULL",
            Self::table()
        );
        let result = sqlx::query(&sql)
            .bind(item.title())
            .bind(item.detail())
            .bind(item.category())
            .bind(item.tags())
            .bind(item.image_url())
            .bind(item.status().as_str())
            .bind(item.updated_at())
            .bind(item.id())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError> {
        soft_delete_row(&self.pool, Self::table(), id, at).await
    }

    async fn record_view(&self, id: i64) -> Result<(), StoreError> {
        increment_views(&self.pool, Self::table(), id).await
    }

    async fn purge_deleted_before(&self, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
        purge_rows(&self.pool, Self::table(), threshold).await
    }

    async fn ids_by_author(&self) -> Result<HashMap<i64, Vec<i64>>, StoreError> {
        live_ids_by_author(&self.pool, Self::table()).await
    }
}
