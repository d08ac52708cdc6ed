//! Shop reports command-line runner.
//!
//! Picks a store from [`Config`], optionally prepares the database, and runs
//! the selected reports through [`ReportRunner`].

pub mod config;
pub mod error;

use std::io::Write;

use chrono::{DateTime, Utc};
use reports::ReportRunner;
use sqlx::postgres::PgPoolOptions;
use store::{Dataset, InMemoryShopStore, PostgresShopStore, ShopStoreError};

pub use config::Config;
pub use error::CliError;

/// Runs the configured reports anchored at `now`, writing them to `out`.
///
/// Returns the number of rows rendered.
pub async fn run<W: Write>(
    config: &Config,
    now: DateTime<Utc>,
    out: &mut W,
) -> Result<usize, CliError> {
    let runner = ReportRunner::new(config.report_query(now)).with_format(config.format);

    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL is not set, querying the built-in sample dataset");
        let store = InMemoryShopStore::sample_at(now);
        return Ok(runner.run(&store, &config.reports, out).await?);
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .map_err(ShopStoreError::from)?;
    let store = PostgresShopStore::new(pool);
    tracing::info!(max_connections = config.max_connections, "connected to PostgreSQL");

    if config.run_migrations {
        store.run_migrations().await?;
        tracing::info!("schema migrations applied");
    }
    if config.seed_sample_data {
        store.load_dataset_if_empty(&Dataset::sample_at(now)).await?;
    }

    let rows = runner.run(&store, &config.reports, out).await;
    store.pool().close().await;
    Ok(rows?)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use reports::{OutputFormat, Report};

    use super::*;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_runs_every_report_against_sample_without_database() {
        let mut out = Vec::new();
        let rows = run(&Config::default(), reference(), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(rows > 0);
        assert!(text.starts_with("=== TASK 01: List All Customers ==="));
        assert!(text.contains("=== TASK 10: Electronics Orders With Top Stocking Store ==="));
    }

    #[tokio::test]
    async fn test_runs_selected_reports_as_json() {
        let config = Config {
            reports: vec![Report::TopCustomers],
            format: OutputFormat::Json,
            ..Config::default()
        };
        let mut out = Vec::new();
        let rows = run(&config, reference(), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(rows, 3);
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"report\":\"top-customers\""));
    }

    #[tokio::test]
    async fn test_unreachable_database_is_store_error() {
        let config = Config {
            database_url: Some("not a url".to_string()),
            ..Config::default()
        };
        let mut out = Vec::new();
        let err = run(&config, reference(), &mut out).await.unwrap_err();

        assert!(matches!(err, CliError::Store(ShopStoreError::Database(_))));
        assert!(out.is_empty());
    }
}
