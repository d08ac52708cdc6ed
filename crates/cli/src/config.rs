//! Run configuration loaded from environment variables.

use chrono::{DateTime, Utc};
use reports::{OutputFormat, Report, parse_selection};
use store::ReportQuery;
use store::query::{
    DEFAULT_RECENT_WINDOW_DAYS, DEFAULT_TOP_CUSTOMERS, ELECTRONICS_CATEGORY,
    MAX_RECENT_WINDOW_DAYS, PENDING_STATUS,
};

use crate::error::CliError;

/// Report run configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `DATABASE_URL` — PostgreSQL URL; unset means the built-in sample dataset
/// - `DATABASE_MAX_CONNECTIONS` — pool size (default: `5`)
/// - `RUN_MIGRATIONS` — create the schema before querying (default: `false`)
/// - `SEED_SAMPLE_DATA` — load the sample dataset into an empty database (default: `false`)
/// - `REPORTS` — comma-separated task numbers or slugs (default: all)
/// - `OUTPUT_FORMAT` — `text` or `json` (default: `text`)
/// - `ORDER_STATUS` — status for the status report (default: `"Pending"`)
/// - `TOP_CUSTOMERS` — rows in the top-customers report (default: `3`)
/// - `RECENT_WINDOW_DAYS` — recent-orders window, `0..=36500` (default: `30`)
/// - `CATEGORY` — category for the stock report (default: `"Electronics"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub seed_sample_data: bool,
    pub reports: Vec<Report>,
    pub format: OutputFormat,
    pub status: String,
    pub top_customers: usize,
    pub recent_window_days: i64,
    pub category: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            database_url: get("DATABASE_URL"),
            max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                defaults.max_connections,
            )?,
            run_migrations: parse_flag("RUN_MIGRATIONS", get("RUN_MIGRATIONS"))?,
            seed_sample_data: parse_flag("SEED_SAMPLE_DATA", get("SEED_SAMPLE_DATA"))?,
            reports: match get("REPORTS") {
                Some(selection) => parse_selection(&selection)?,
                None => defaults.reports,
            },
            format: match get("OUTPUT_FORMAT") {
                Some(format) => format.parse()?,
                None => defaults.format,
            },
            status: get("ORDER_STATUS").unwrap_or(defaults.status),
            top_customers: parse_or(
                "TOP_CUSTOMERS",
                get("TOP_CUSTOMERS"),
                defaults.top_customers,
            )?,
            recent_window_days: parse_window(get("RECENT_WINDOW_DAYS"))?,
            category: get("CATEGORY").unwrap_or(defaults.category),
        })
    }

    /// Report parameters anchored at `now`.
    pub fn report_query(&self, now: DateTime<Utc>) -> ReportQuery {
        ReportQuery::at(now)
            .status(self.status.clone())
            .top_customers(self.top_customers)
            .recent_window_days(self.recent_window_days)
            .category(self.category.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
            run_migrations: false,
            seed_sample_data: false,
            reports: Report::ALL.to_vec(),
            format: OutputFormat::Text,
            status: PENDING_STATUS.to_string(),
            top_customers: DEFAULT_TOP_CUSTOMERS,
            recent_window_days: DEFAULT_RECENT_WINDOW_DAYS,
            category: ELECTRONICS_CATEGORY.to_string(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> Result<T, CliError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CliError::Config(format!("{key} has invalid value {raw:?}"))),
        None => Ok(default),
    }
}

fn parse_window(value: Option<String>) -> Result<i64, CliError> {
    let days = parse_or("RECENT_WINDOW_DAYS", value, DEFAULT_RECENT_WINDOW_DAYS)?;
    if !(0..=MAX_RECENT_WINDOW_DAYS).contains(&days) {
        return Err(CliError::Config(format!(
            "RECENT_WINDOW_DAYS must be between 0 and {MAX_RECENT_WINDOW_DAYS}, got {days}"
        )));
    }
    Ok(days)
}

fn parse_flag(key: &str, value: Option<String>) -> Result<bool, CliError> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CliError::Config(format!("{key} must be a boolean, got {raw:?}"))),
    }
}
