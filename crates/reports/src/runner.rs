//! Sequential execution of a report selection.

use std::io::Write;
use std::str::FromStr;

use store::{ReportQuery, ShopStore};

use crate::report::Report;
use crate::{ReportError, Result};

/// How report results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Headed sections of console lines.
    #[default]
    Text,
    /// One JSON object per report, one per line.
    Json,
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Runs reports one after another and writes their results.
///
/// The runner owns only the query parameters; the store is handed to each
/// [`run`](Self::run) call.
#[derive(Debug, Clone)]
pub struct ReportRunner {
    query: ReportQuery,
    format: OutputFormat,
}

impl ReportRunner {
    /// Creates a text runner.
    pub fn new(query: ReportQuery) -> Self {
        Self {
            query,
            format: OutputFormat::Text,
        }
    }

    /// Switches the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn query(&self) -> &ReportQuery {
        &self.query
    }

    /// Runs `reports` in order against `store`, writing each result to `out`
    /// as soon as it is available.
    ///
    /// Stops at the first failing report. Returns the total number of rows.
    #[tracing::instrument(skip_all, fields(reports = reports.len()))]
    pub async fn run<S, W>(&self, store: &S, reports: &[Report], out: &mut W) -> Result<usize>
    where
        S: ShopStore + ?Sized,
        W: Write + ?Sized,
    {
        let mut total_rows = 0;

        for (position, report) in reports.iter().enumerate() {
            let output = report.execute(store, &self.query).await?;
            total_rows += output.row_count();

            match self.format {
                OutputFormat::Text => {
                    if position > 0 {
                        writeln!(out)?;
                    }
                    writeln!(
                        out,
                        "=== TASK {:02}: {} ===",
                        report.number(),
                        report.title(&self.query)
                    )?;
                    output.write_to(out)?;
                }
                OutputFormat::Json => {
                    let value = serde_json::json!({
                        "task": report.number(),
                        "report": report.slug(),
                        "title": report.title(&self.query),
                        "output": output,
                    });
                    serde_json::to_writer(&mut *out, &value).map_err(std::io::Error::from)?;
                    writeln!(out)?;
                }
            }
        }

        out.flush()?;
        tracing::info!(total_rows, "reports finished");
        Ok(total_rows)
    }
}
