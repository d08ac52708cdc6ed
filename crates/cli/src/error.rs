//! CLI error types.

use reports::ReportError;
use store::ShopStoreError;
use thiserror::Error;

/// Errors that end a report run.
#[derive(Debug, Error)]
pub enum CliError {
    /// An environment variable held a value that could not be used.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connecting, migrating or seeding failed.
    #[error(transparent)]
    Store(#[from] ShopStoreError),

    /// A report failed.
    #[error(transparent)]
    Report(#[from] ReportError),
}
