use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Caller contract violations. The gate filters these upstream; seeing one
/// here means a caller passed an unusable lockout key.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Origin identifier must not be empty")]
    EmptyOrigin,

    #[error("Account identifier must not be empty")]
    EmptyAccount,
}

impl Error {
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
