//! Report error types.

use thiserror::Error;

/// Errors that can occur while running reports.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The store failed to answer a query.
    #[error("Store error: {0}")]
    Store(#[from] store::ShopStoreError),

    /// Writing the report text failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// A report selector matched no report.
    #[error("Unknown report: {0}")]
    UnknownReport(String),

    /// An output format name matched no format.
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
