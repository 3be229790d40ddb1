use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    attempt::{AttemptWindow, LoginAttempt, NewLoginAttempt},
    repositories::{LoginAttemptRepository, RepositoryProvider},
};

/// Adapter that wraps a RepositoryProvider and implements the ledger trait
pub struct AttemptRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> AttemptRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> LoginAttemptRepository for AttemptRepositoryAdapter<R> {
    async fn insert(&self, attempt: &NewLoginAttempt) -> Result<LoginAttempt, Error> {
        self.provider.attempts().insert(attempt).await
    }

    async fn count_failures_since(
        &self,
        origin: &str,
        account: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<AttemptWindow, Error> {
        self.provider
            .attempts()
            .count_failures_since(origin, account, cutoff)
            .await
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.attempts().delete_older_than(cutoff).await
    }
}
