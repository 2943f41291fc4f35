//! SQLite Account Repository
//!
//! 余额变更只通过原子 UPDATE: 扣费带余额下限条件，退款无条件加回。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{AccountRecord, AccountRepositoryPort, RepositoryError};

/// SQLite Account Repository
pub struct SqliteAccountRepository {
    pool: DbPool,
}

impl SqliteAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AccountRow {
    id: String,
    token_balance: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<AccountRow> for AccountRecord {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(AccountRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            token_balance: row.token_balance,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl AccountRepositoryPort for SqliteAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, token_balance, created_at, updated_at FROM accounts WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(AccountRecord::try_from).transpose()
    }

    async fn ensure(&self, id: Uuid, initial_balance: i64) -> Result<AccountRecord, RepositoryError> {
        let now = Utc::now().to_rfc3339();

        // 已存在则什么都不做
        sqlx::query(
            r#"
            INSERT INTO accounts (id, token_balance, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(id.to_string())
        .bind(initial_balance)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Account {}", id)))
    }

    async fn try_debit(&self, id: Uuid, amount: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET token_balance = token_balance - ?, updated_at = ?
            WHERE id = ? AND token_balance >= ?
            "#,
        )
        .bind(amount)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(amount)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn credit(&self, id: Uuid, amount: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET token_balance = token_balance + ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(amount)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Account {}", id)));
        }
        Ok(())
    }
}
