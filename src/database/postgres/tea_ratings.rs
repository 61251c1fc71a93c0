use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

use super::{
    author_summary, like_pattern, limit_offset, live_ids_by_author, purge_rows, soft_delete_row,
};
use crate::database::models::{AuthorSummary, Content, TeaRating};
use crate::database::store::{ContentStore, StoreError};
use crate::dto::{CreateTeaRating, TeaRatingFilter};
use crate::types::{Lifecycle, Page};

const TABLE: &str = "tea_ratings";

const TEA_RATING_SELECT: &str = "SELECT t.id, t.author_id, a.name AS author_name, a.email AS author_email, \
     t.rating, t.status, t.location, t.review, t.created_at, t.updated_at, t.deleted_at \
     FROM tea_ratings t JOIN accounts a ON a.id = t.author_id";

#[derive(Debug, FromRow)]
struct TeaRatingRow {
    id: i64,
    author_id: i64,
    author_name: String,
    author_email: String,
    rating: i32,
    status: String,
    location: String,
    review: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<TeaRatingRow> for TeaRating {
    type Error = StoreError;

    fn try_from(row: TeaRatingRow) -> Result<Self, Self::Error> {
        Ok(TeaRating {
            id: row.id,
            author: author_summary(row.author_id, row.author_name, row.author_email),
            rating: row.rating,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            location: row.location,
            review: row.review,
            created_at: row.created_at,
            updated_at: row.updated_at,
            lifecycle: Lifecycle::from_deleted_at(row.deleted_at),
        })
    }
}

pub struct PgTeaRatingStore {
    pool: PgPool,
}

impl PgTeaRatingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_conditions(query: &mut QueryBuilder<'_, Postgres>, filter: &TeaRatingFilter) {
        query.push(" WHERE t.deleted_at IS NULL");
        if let Some(location) = &filter.location {
            query.push(" AND t.location ILIKE ").push_bind(like_pattern(location));
        }
        if let Some(min) = filter.min_rating {
            query.push(" AND t.rating >= ").push_bind(min);
        }
        if let Some(max) = filter.max_rating {
            query.push(" AND t.rating <= ").push_bind(max);
        }
    }
}

#[async_trait]
impl ContentStore<TeaRating> for PgTeaRatingStore {
    async fn insert(&self, author: AuthorSummary, draft: CreateTeaRating, now: DateTime<Utc>) -> Result<TeaRating, StoreError> {
        let now = now.trunc_subsecs(6);
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO tea_ratings (author_id, rating, status, location, review, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING id",
        )
        .bind(author.id)
        .bind(draft.rating)
        .bind(draft.status.unwrap_or_default().as_str())
        .bind(&draft.location)
        .bind(&draft.review)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(TeaRating::from_draft(id, author, draft, now))
    }

    async fn find(&self, id: i64) -> Result<Option<TeaRating>, StoreError> {
        let sql = format!("{} WHERE t.id = $1 AND t.deleted_at IS NULL", TEA_RATING_SELECT);
        let row: Option<TeaRatingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TeaRating::try_from).transpose()
    }

    async fn list(&self, filter: &TeaRatingFilter, page: Page) -> Result<(Vec<TeaRating>, u64), StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tea_ratings t");
        Self::push_conditions(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let (limit, offset) = limit_offset(page);
        let mut select = QueryBuilder::<Postgres>::new(TEA_RATING_SELECT);
        Self::push_conditions(&mut select, filter);
        select
            .push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows: Vec<TeaRatingRow> = select.build_query_as().fetch_all(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(TeaRating::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total as u64))
    }

    async fn update(&self, item: &TeaRating) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE tea_ratings SET rating = $1, status = $2, location = $3, review = $4, updated_at = $5 \
             WHERE id = $6 AND deleted_at IS NULL",
        )
        .bind(item.rating)
        .bind(item.status.as_str())
        .bind(&item.location)
        .bind(&item.review)
        .bind(item.updated_at)
        .bind(item.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError> {
        soft_delete_row(&self.pool, TABLE, id, at).await
    }

    /// Ratings carry no view counter
    async fn record_view(&self, _id: i64) -> Result<(), StoreError> {
        Ok(())
    }

    async fn purge_deleted_before(&self, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
        purge_rows(&self.pool, TABLE, threshold).await
    }

    async fn ids_by_author(&self) -> Result<HashMap<i64, Vec<i64>>, StoreError> {
        live_ids_by_author(&self.pool, TABLE).await
    }
}
