use async_trait::async_trait;
use sqlx::PgPool;

use super::{violated_constraint, FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};
use crate::database::models::{TaxonomyEntry, TaxonomyKind};
use crate::database::store::{StoreError, TaxonomyStore};

pub struct PgTaxonomyStore {
    pool: PgPool,
}

impl PgTaxonomyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaxonomyStore for PgTaxonomyStore {
    async fn create(&self, kind: TaxonomyKind, name: &str) -> Result<TaxonomyEntry, StoreError> {
        let sql = format!("INSERT INTO {} (name) VALUES ($1) RETURNING id, name", kind.table());
        sqlx::query_as::<_, TaxonomyEntry>(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match violated_constraint(&e, UNIQUE_VIOLATION) {
                Some(_) => StoreError::Duplicate("name".to_string()),
                None => StoreError::Sqlx(e),
            })
    }

    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyEntry>, StoreError> {
        let sql = format!("SELECT id, name FROM {} ORDER BY name", kind.table());
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn find(&self, kind: TaxonomyKind, id: i64) -> Result<Option<TaxonomyEntry>, StoreError> {
        let sql = format!("SELECT id, name FROM {} WHERE id = $1", kind.table());
        Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn delete(&self, kind: TaxonomyKind, id: i64) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match violated_constraint(&e, FOREIGN_KEY_VIOLATION) {
                Some(_) => StoreError::InUse(kind.label().to_string()),
                None => StoreError::Sqlx(e),
            })?;
        Ok(result.rows_affected() > 0)
    }
}
