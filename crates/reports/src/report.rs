//! The catalogue of reports.

use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use store::{ReportQuery, ShopStore};

use crate::output::ReportOutput;
use crate::{ReportError, Result};

/// One of the ten shop reports.
///
/// Reports are independent: none reads another's output, and each one only
/// reads from the store it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Report {
    ListCustomers,
    OrdersWithItemCount,
    ProductsByPrice,
    OrdersByStatus,
    OrdersPerCustomer,
    TopCustomers,
    RecentOrders,
    UnitsSold,
    DiscountedOrders,
    CategoryStock,
}

impl Report {
    /// All reports in task order.
    pub const ALL: [Report; 10] = [
        Report::ListCustomers,
        Report::OrdersWithItemCount,
        Report::ProductsByPrice,
        Report::OrdersByStatus,
        Report::OrdersPerCustomer,
        Report::TopCustomers,
        Report::RecentOrders,
        Report::UnitsSold,
        Report::DiscountedOrders,
        Report::CategoryStock,
    ];

    /// Task number, 1 through 10.
    pub fn number(&self) -> u8 {
        match self {
            Report::ListCustomers => 1,
            Report::OrdersWithItemCount => 2,
            Report::ProductsByPrice => 3,
            Report::OrdersByStatus => 4,
            Report::OrdersPerCustomer => 5,
            Report::TopCustomers => 6,
            Report::RecentOrders => 7,
            Report::UnitsSold => 8,
            Report::DiscountedOrders => 9,
            Report::CategoryStock => 10,
        }
    }

    /// Stable identifier used in configuration and metric labels.
    pub fn slug(&self) -> &'static str {
        match self {
            Report::ListCustomers => "list-customers",
            Report::OrdersWithItemCount => "orders-with-item-count",
            Report::ProductsByPrice => "products-by-price",
            Report::OrdersByStatus => "orders-by-status",
            Report::OrdersPerCustomer => "orders-per-customer",
            Report::TopCustomers => "top-customers",
            Report::RecentOrders => "recent-orders",
            Report::UnitsSold => "units-sold",
            Report::DiscountedOrders => "discounted-orders",
            Report::CategoryStock => "category-stock",
        }
    }

    /// Heading shown above the report's rows.
    pub fn title(&self, query: &ReportQuery) -> String {
        match self {
            Report::ListCustomers => "List All Customers".to_string(),
            Report::OrdersWithItemCount => "List Orders With Item Count".to_string(),
            Report::ProductsByPrice => "List Products By Descending Price".to_string(),
            Report::OrdersByStatus => {
                format!("List {} Orders With Total Price", query.status)
            }
            Report::OrdersPerCustomer => "Order Count Per Customer".to_string(),
            Report::TopCustomers => {
                format!("Top {} Customers By Order Value", query.top_customers)
            }
            Report::RecentOrders => format!(
                "Orders From The Last {} Days",
                query.recent_window_days
            ),
            Report::UnitsSold => "Total Sold Per Product".to_string(),
            Report::DiscountedOrders => "Discounted Orders".to_string(),
            Report::CategoryStock => {
                format!("{} Orders With Top Stocking Store", query.category)
            }
        }
    }

    /// Runs the report against `store`.
    #[tracing::instrument(skip(self, store, query), fields(report = self.slug()))]
    pub async fn execute<S: ShopStore + ?Sized>(
        &self,
        store: &S,
        query: &ReportQuery,
    ) -> Result<ReportOutput> {
        let started = Instant::now();

        let output = match self {
            Report::ListCustomers => ReportOutput::Customers(store.list_customers().await?),
            Report::OrdersWithItemCount => {
                ReportOutput::OrderItemCounts(store.orders_with_item_counts().await?)
            }
            Report::ProductsByPrice => {
                ReportOutput::ProductPrices(store.products_by_price_desc().await?)
            }
            Report::OrdersByStatus => ReportOutput::OrderTotals(
                store.orders_with_status_totals(&query.status).await?,
            ),
            Report::OrdersPerCustomer => {
                ReportOutput::CustomerOrderCounts(store.order_counts_per_customer().await?)
            }
            Report::TopCustomers => ReportOutput::TopCustomers(
                store.top_customers_by_value(query.top_customers).await?,
            ),
            Report::RecentOrders => ReportOutput::RecentOrders(
                store.orders_placed_since(query.recent_cutoff()).await?,
            ),
            Report::UnitsSold => ReportOutput::ProductSales(store.units_sold_per_product().await?),
            Report::DiscountedOrders => {
                ReportOutput::DiscountedOrders(store.discounted_orders().await?)
            }
            Report::CategoryStock => ReportOutput::CategoryOrders(
                store
                    .category_orders_with_top_stock(&query.category)
                    .await?,
            ),
        };

        let duration = started.elapsed().as_secs_f64();
        let rows = output.row_count();
        metrics::counter!("reports_executed_total", "report" => self.slug()).increment(1);
        metrics::counter!("report_rows_total", "report" => self.slug()).increment(rows as u64);
        metrics::histogram!("report_duration_seconds", "report" => self.slug()).record(duration);
        tracing::debug!(rows, duration, "report executed");

        Ok(output)
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Report {
    type Err = ReportError;

    /// Accepts a task number (`"4"`, `"04"`) or a slug (`"orders-by-status"`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(number) = s.parse::<u8>() {
            return Report::ALL
                .into_iter()
                .find(|r| r.number() == number)
                .ok_or_else(|| ReportError::UnknownReport(s.to_string()));
        }
        Report::ALL
            .into_iter()
            .find(|r| r.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| ReportError::UnknownReport(s.to_string()))
    }
}

/// Parses a comma-separated report selection, keeping the given order and
/// dropping repeats. An empty selection means every report.
pub fn parse_selection(selection: &str) -> Result<Vec<Report>> {
    let mut reports = Vec::new();
    for part in selection.split(',').filter(|p| !p.trim().is_empty()) {
        let report: Report = part.parse()?;
        if !reports.contains(&report) {
            reports.push(report);
        }
    }
    if reports.is_empty() {
        return Ok(Report::ALL.to_vec());
    }
    Ok(reports)
}
