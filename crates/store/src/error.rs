use thiserror::Error;

/// Errors that can occur when reading from a shop store.
#[derive(Debug, Error)]
pub enum ShopStoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A dataset broke referential integrity or reused an identifier.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// An aggregated amount left the representable money range.
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),
}

/// Result type for shop store operations.
pub type Result<T> = std::result::Result<T, ShopStoreError>;
