//! Integration tests: sample dataset → InMemoryShopStore → ReportRunner text.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reports::{OutputFormat, Report, ReportError, ReportOutput, ReportRunner};
use store::{
    CategoryOrder, CustomerContact, CustomerOrderCount, CustomerOrderValue, DiscountedOrder,
    InMemoryShopStore, OrderItemCount, OrderTotal, ProductPrice, ProductSales, RecentOrder,
    ReportQuery, ShopStore, ShopStoreError,
};

fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

const EXPECTED_TEXT: &str = "\
=== TASK 01: List All Customers ===
Alice Smith - alice@example.com
Bob Jones - bob@example.com
Carol White - carol@example.com
Dave Brown - dave@example.com
Erin Green - erin@example.com

=== TASK 02: List Orders With Item Count ===
Order #101 | Alice Smith | Status: Pending | Items: 3
Order #102 | Alice Smith | Status: Shipped | Items: 3
Order #103 | Bob Jones | Status: pending | Items: 1
Order #104 | Bob Jones | Status: Pending | Items: 6
Order #105 | Carol White | Status: Completed | Items: 3
Order #106 | Erin Green | Status: Completed | Items: 1

=== TASK 03: List Products By Descending Price ===
Laptop - $1200.00
Smartwatch - $250.00
Headphones - $150.00
Coffee Maker - $80.00
Novel - $15.00
Phone Case - $15.00

=== TASK 04: List Pending Orders With Total Price ===
Order #101 | Alice Smith | Date: 2024-06-13 | Total: $1400.00
Order #104 | Bob Jones | Date: 2024-06-05 | Total: $90.00

=== TASK 05: Order Count Per Customer ===
Alice Smith: 2 orders
Bob Jones: 2 orders
Carol White: 1 orders
Erin Green: 1 orders

=== TASK 06: Top 3 Customers By Order Value ===
Alice Smith - Total: $1445.00
Carol White - Total: $300.00
Erin Green - Total: $250.00

=== TASK 07: Orders From The Last 30 Days ===
Order #101 | 2024-06-13 | Alice Smith
Order #102 | 2024-05-16 | Alice Smith
Order #104 | 2024-06-05 | Bob Jones

=== TASK 08: Total Sold Per Product ===
Novel - Sold: 5
Phone Case - Sold: 4
Headphones - Sold: 3
Coffee Maker - Sold: 3
Laptop - Sold: 1
Smartwatch - Sold: 1

=== TASK 09: Discounted Orders ===
Order #101 | Alice Smith
 - Discounted Product: Laptop | Discount: $100.00
Order #103 | Bob Jones
 - Discounted Product: Coffee Maker | Discount: $5.00
Order #105 | Carol White
 - Discounted Product: Headphones | Discount: $10.00

=== TASK 10: Electronics Orders With Top Stocking Store ===
Order #101 | Customer: Alice Smith
 - Product: Laptop | Top Store: Airport (12 units)
 - Product: Headphones | Top Store: Downtown (20 units)
Order #105 | Customer: Carol White
 - Product: Headphones | Top Store: Downtown (20 units)
Order #106 | Customer: Erin Green
 - Product: Smartwatch | Top Store: N/A (0 units)
";

#[tokio::test]
async fn test_all_reports_render_sample_dataset() {
    let store = InMemoryShopStore::sample_at(reference());
    let runner = ReportRunner::new(ReportQuery::at(reference()));
    let mut out = Vec::new();

    let rows = runner.run(&store, &Report::ALL, &mut out).await.unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), EXPECTED_TEXT);
    assert_eq!(rows, 41);
}

#[tokio::test]
async fn test_selected_reports_run_in_given_order() {
    let store = InMemoryShopStore::sample_at(reference());
    let runner = ReportRunner::new(ReportQuery::at(reference()));
    let mut out = Vec::new();

    runner
        .run(
            &store,
            &[Report::TopCustomers, Report::ListCustomers],
            &mut out,
        )
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let headers: Vec<_> = text.lines().filter(|l| l.starts_with("===")).collect();
    assert_eq!(
        headers,
        vec![
            "=== TASK 06: Top 3 Customers By Order Value ===",
            "=== TASK 01: List All Customers ===",
        ]
    );
}

#[tokio::test]
async fn test_query_parameters_reach_the_store() {
    let store = InMemoryShopStore::sample_at(reference());
    let query = ReportQuery::at(reference())
        .status("pending")
        .top_customers(10)
        .recent_window_days(31)
        .category("Home");

    let pending = Report::OrdersByStatus.execute(&store, &query).await.unwrap();
    let ReportOutput::OrderTotals(rows) = pending else {
        panic!("unexpected output for orders-by-status");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].order_id.as_i64(), 103);

    let top = Report::TopCustomers.execute(&store, &query).await.unwrap();
    assert_eq!(top.row_count(), 5);

    let recent = Report::RecentOrders.execute(&store, &query).await.unwrap();
    assert_eq!(recent.row_count(), 4);

    let home = Report::CategoryStock.execute(&store, &query).await.unwrap();
    let ReportOutput::CategoryOrders(orders) = home else {
        panic!("unexpected output for category-stock");
    };
    let ids: Vec<_> = orders.iter().map(|o| o.order_id.as_i64()).collect();
    assert_eq!(ids, vec![101, 103, 105]);
}

#[tokio::test]
async fn test_json_output_has_one_line_per_report() {
    let store = InMemoryShopStore::sample_at(reference());
    let runner =
        ReportRunner::new(ReportQuery::at(reference())).with_format(OutputFormat::Json);
    let mut out = Vec::new();

    runner
        .run(&store, &[Report::ListCustomers, Report::UnitsSold], &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["task"], 1);
    assert_eq!(lines[0]["output"]["kind"], "customers");
    assert_eq!(lines[1]["report"], "units-sold");
    assert_eq!(lines[1]["output"]["rows"][0]["product_name"], "Novel");
    assert_eq!(lines[1]["output"]["rows"][0]["total_sold"], 5);
}

/// A store whose every query fails, standing in for a lost connection.
struct UnavailableStore;

fn unavailable<T>() -> store::Result<T> {
    Err(ShopStoreError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl ShopStore for UnavailableStore {
    async fn list_customers(&self) -> store::Result<Vec<CustomerContact>> {
        unavailable()
    }
    async fn orders_with_item_counts(&self) -> store::Result<Vec<OrderItemCount>> {
        unavailable()
    }
    async fn products_by_price_desc(&self) -> store::Result<Vec<ProductPrice>> {
        unavailable()
    }
    async fn orders_with_status_totals(&self, _status: &str) -> store::Result<Vec<OrderTotal>> {
        unavailable()
    }
    async fn order_counts_per_customer(&self) -> store::Result<Vec<CustomerOrderCount>> {
        unavailable()
    }
    async fn top_customers_by_value(
        &self,
        _limit: usize,
    ) -> store::Result<Vec<CustomerOrderValue>> {
        unavailable()
    }
    async fn orders_placed_since(
        &self,
        _cutoff: DateTime<Utc>,
    ) -> store::Result<Vec<RecentOrder>> {
        unavailable()
    }
    async fn units_sold_per_product(&self) -> store::Result<Vec<ProductSales>> {
        unavailable()
    }
    async fn discounted_orders(&self) -> store::Result<Vec<DiscountedOrder>> {
        unavailable()
    }
    async fn category_orders_with_top_stock(
        &self,
        _category: &str,
    ) -> store::Result<Vec<CategoryOrder>> {
        unavailable()
    }
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let runner = ReportRunner::new(ReportQuery::at(reference()));
    let mut out = Vec::new();

    let result = runner.run(&UnavailableStore, &Report::ALL, &mut out).await;

    assert!(matches!(
        result,
        Err(ReportError::Store(ShopStoreError::Database(_)))
    ));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_runs_against_trait_object() {
    let store: Box<dyn ShopStore> = Box::new(InMemoryShopStore::sample_at(reference()));
    let runner = ReportRunner::new(ReportQuery::at(reference()));
    let mut out = Vec::new();

    let rows = runner
        .run(store.as_ref(), &[Report::DiscountedOrders], &mut out)
        .await
        .unwrap();

    assert_eq!(rows, 3);
}
