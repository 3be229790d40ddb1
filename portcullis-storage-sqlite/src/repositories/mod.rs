//! Repository implementations for SQLite storage

pub mod attempt;

pub use attempt::SqliteAttemptRepository;

use async_trait::async_trait;
use portcullis_core::{
    Error,
    error::StorageError,
    repositories::{AttemptRepositoryProvider, RepositoryProvider},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Repository provider implementation for SQLite
///
/// This struct implements the attempt repository provider trait as well as
/// the unified `RepositoryProvider` trait.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    attempts: Arc<SqliteAttemptRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let attempts = Arc::new(SqliteAttemptRepository::new(pool.clone()));

        Self { pool, attempts }
    }
}

impl AttemptRepositoryProvider for SqliteRepositoryProvider {
    type AttemptRepo = SqliteAttemptRepository;

    fn attempts(&self) -> &Self::AttemptRepo {
        &self.attempts
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        use crate::migrations::{
            CreateLoginAttemptsIndex, CreateLoginAttemptsTable, SqliteMigrationManager,
        };
        use portcullis_migration::{Migration, MigrationManager};

        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        let migrations: Vec<Box<dyn Migration<_>>> = vec![
            Box::new(CreateLoginAttemptsTable),
            Box::new(CreateLoginAttemptsIndex),
        ];
        manager.up(&migrations).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(())
    }
}
