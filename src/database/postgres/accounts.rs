use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{violated_constraint, UNIQUE_VIOLATION};
use crate::database::models::{Account, NewAccount};
use crate::database::store::{AccountStore, StoreError};
use crate::types::{Lifecycle, Role};

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role, created_at, deleted_at";

#[derive(Debug, FromRow)]
struct AccountRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
            lifecycle: Lifecycle::from_deleted_at(row.deleted_at),
        })
    }
}

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {} FROM accounts WHERE {}", ACCOUNT_COLUMNS, clause);
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Account::try_from).transpose()
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let sql = format!(
            "INSERT INTO accounts (name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            ACCOUNT_COLUMNS
        );
        let row: AccountRow = sqlx::query_as(&sql)
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match violated_constraint(&e, UNIQUE_VIOLATION) {
                Some(constraint) if constraint.contains("name") => StoreError::Duplicate("name".to_string()),
                Some(_) => StoreError::Duplicate("email".to_string()),
                None => StoreError::Sqlx(e),
            })?;
        Account::try_from(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Account::try_from).transpose()
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.fetch_one_where("email = $1 AND deleted_at IS NULL", email).await
    }

    async fn find_active_by_name(&self, name: &str) -> Result<Option<Account>, StoreError> {
        self.fetch_one_where("name = $1 AND deleted_at IS NULL", name).await
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE accounts SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_deleted(&self, id: i64, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE accounts SET deleted_at = $1 WHERE id = $2 AND deleted_at IS NULL")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let sql = format!("SELECT {} FROM accounts ORDER BY id", ACCOUNT_COLUMNS);
        let rows: Vec<AccountRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(Account::try_from).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
