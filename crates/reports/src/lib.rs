//! The ten shop reports.
//!
//! - [`Report`] names each report and executes it against any
//!   [`ShopStore`](store::ShopStore) passed in
//! - [`ReportOutput`] holds the named rows of one report and renders them
//! - [`ReportRunner`] runs a selection of reports and writes the console text

pub mod error;
pub mod output;
pub mod report;
pub mod runner;

pub use error::{ReportError, Result};
pub use output::ReportOutput;
pub use report::{Report, parse_selection};
pub use runner::{OutputFormat, ReportRunner};
