//! `shop-reports` entry point.

use std::process::ExitCode;

use chrono::{SubsecRound, Utc};
use cli::Config;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Initialize tracing; stdout is reserved for report output
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(json_layer)
        .with(text_layer)
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = match prometheus_builder.install_recorder() {
        Ok(handle) => Some(handle),
        Err(error) => {
            tracing::warn!(%error, "metrics recorder unavailable");
            None
        }
    };

    // 3. Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    // 4. Run reports; Postgres keeps microseconds, so "now" does too
    let now = Utc::now().trunc_subsecs(6);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = tokio::select! {
        result = cli::run(&config, now, &mut out) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received SIGINT, aborting report run");
            return ExitCode::FAILURE;
        }
    };

    let code = match result {
        Ok(rows) => {
            tracing::info!(rows, reports = config.reports.len(), "reports finished");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(%error, "report run failed");
            ExitCode::FAILURE
        }
    };

    if let Some(handle) = metrics_handle {
        tracing::debug!(metrics = %handle.render(), "metrics snapshot");
    }
    code
}
