//! PostgreSQL store implementations

mod accounts;
mod articles;
mod job_postings;
mod taxonomy;
mod tea_ratings;

pub use accounts::PgAccountStore;
pub use articles::{Article, ArticleRow, PgArticleStore};
pub use job_postings::PgJobPostingStore;
pub use taxonomy::PgTaxonomyStore;
pub use tea_ratings::PgTeaRatingStore;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;

use super::models::AuthorSummary;
use super::store::StoreError;
use crate::types::Page;

pub(crate) const UNIQUE_VIOLATION: &str = "23505";
pub(crate) const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Name of the violated constraint when `err` carries the given SQLSTATE
pub(crate) fn violated_constraint(err: &sqlx::Error, code: &str) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(code) => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

/// Escape LIKE metacharacters and wrap for a substring match
pub(crate) fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub(crate) fn limit_offset(page: Page) -> (i64, i64) {
    (page.limit as i64, page.offset() as i64)
}

pub(crate) fn author_summary(id: i64, name: String, email: String) -> AuthorSummary {
    AuthorSummary { id, name, email }
}

/// Operations identical across content tables. `table` is always a compile-time constant.
pub(crate) async fn soft_delete_row(pool: &PgPool, table: &str, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError> {
    let sql = format!("UPDATE {} SET deleted_at = $1 WHERE id = $2 AND deleted_at IS NULL", table);
    let result = sqlx::query(&sql).bind(at).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn increment_views(pool: &PgPool, table: &str, id: i64) -> Result<(), StoreError> {
    let sql = format!(
        "UPDATE {} SET view_count = view_count + 1 WHERE id = $1 AND deleted_at IS NULL",
        table
    );
    sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(())
}

pub(crate) async fn purge_rows(pool: &PgPool, table: &str, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
    let sql = format!(
        "DELETE FROM {} WHERE deleted_at IS NOT NULL AND deleted_at < $1",
        table
    );
    let result = sqlx::query(&sql).bind(threshold).execute(pool).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn live_ids_by_author(pool: &PgPool, table: &str) -> Result<HashMap<i64, Vec<i64>>, StoreError> {
    let sql = format!(
        "SELECT author_id, id FROM {} WHERE deleted_at IS NULL ORDER BY id",
        table
    );
    let rows: Vec<(i64, i64)> = sqlx::query_as(&sql).fetch_all(pool).await?;

    let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
    for (author_id, id) in rows {
        grouped.entry(author_id).or_default().push(id);
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("oolong"), "%oolong%");
        assert_eq!(like_pattern("100%_pure"), "%100\\%\\_pure%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn limit_offset_follows_page() {
        assert_eq!(limit_offset(Page { page: 3, limit: 20 }), (20, 40));
    }
}
