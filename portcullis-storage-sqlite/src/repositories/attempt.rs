//! SQLite implementation of the login attempt ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portcullis_core::{
    Error,
    attempt::{AttemptWindow, LoginAttempt, NewLoginAttempt},
    error::StorageError,
    repositories::LoginAttemptRepository,
};
use sqlx::SqlitePool;

/// SQLite repository for login attempt rows.
pub struct SqliteAttemptRepository {
    pool: SqlitePool,
}

impl SqliteAttemptRepository {
    /// Create a new SQLite attempt repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Internal struct for query results
#[derive(Debug, sqlx::FromRow)]
struct SqliteLoginAttempt {
    id: i64,
    origin: String,
    account: String,
    attempted_at: i64,
    succeeded: bool,
}

impl From<SqliteLoginAttempt> for LoginAttempt {
    fn from(row: SqliteLoginAttempt) -> Self {
        LoginAttempt {
            id: row.id,
            origin: row.origin,
            account: row.account,
            attempted_at: DateTime::from_timestamp_millis(row.attempted_at)
                .expect("Invalid timestamp"),
            succeeded: row.succeeded,
        }
    }
}

/// Internal struct for the windowed failure statistics query
#[derive(Debug, sqlx::FromRow)]
struct SqliteAttemptWindow {
    count: i32,
    last_failure_at: Option<i64>,
}

#[async_trait]
impl LoginAttemptRepository for SqliteAttemptRepository {
    async fn insert(&self, attempt: &NewLoginAttempt) -> Result<LoginAttempt, Error> {
        let row = sqlx::query_as::<_, SqliteLoginAttempt>(
            r#"
            INSERT INTO login_attempts (origin, account, attempted_at, succeeded)
            VALUES (?, ?, ?, ?)
            RETURNING id, origin, account, attempted_at, succeeded
            "#,
        )
        .bind(&attempt.origin)
        .bind(&attempt.account)
        .bind(attempt.attempted_at.timestamp_millis())
        .bind(attempt.succeeded)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to record login attempt");
            StorageError::Database("Failed to record login attempt".to_string())
        })?;

        Ok(row.into())
    }

    async fn count_failures_since(
        &self,
        origin: &str,
        account: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<AttemptWindow, Error> {
        let cutoff_timestamp = cutoff.timestamp_millis();

        let row = sqlx::query_as::<_, SqliteAttemptWindow>(
            r#"
            SELECT
                COUNT(*) as count,
                MAX(attempted_at) as last_failure_at
            FROM login_attempts
            WHERE origin = ? AND account = ? AND succeeded = 0 AND attempted_at > ?
            "#,
        )
        .bind(origin)
        .bind(account)
        .bind(cutoff_timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count login failures");
            StorageError::Database("Failed to count login failures".to_string())
        })?;

        Ok(AttemptWindow {
            count: row.count as u32,
            last_failure_at: row.last_failure_at.and_then(DateTime::from_timestamp_millis),
        })
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE attempted_at < ?")
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to delete expired login attempts");
                StorageError::Database("Failed to delete expired login attempts".to_string())
            })?;

        Ok(result.rows_affected())
    }
}
