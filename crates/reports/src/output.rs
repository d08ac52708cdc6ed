//! Report rows and their console rendering.

use std::io::Write;

use serde::Serialize;
use store::{
    CategoryOrder, CustomerContact, CustomerOrderCount, CustomerOrderValue, DiscountedOrder,
    OrderItemCount, OrderTotal, ProductPrice, ProductSales, RecentOrder,
};

/// Date format of order dates in report lines.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Marker printed when no store stocks a product.
const NOT_AVAILABLE: &str = "N/A";

/// The rows produced by one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum ReportOutput {
    Customers(Vec<CustomerContact>),
    OrderItemCounts(Vec<OrderItemCount>),
    ProductPrices(Vec<ProductPrice>),
    OrderTotals(Vec<OrderTotal>),
    CustomerOrderCounts(Vec<CustomerOrderCount>),
    TopCustomers(Vec<CustomerOrderValue>),
    RecentOrders(Vec<RecentOrder>),
    ProductSales(Vec<ProductSales>),
    DiscountedOrders(Vec<DiscountedOrder>),
    CategoryOrders(Vec<CategoryOrder>),
}

impl ReportOutput {
    /// Number of top-level rows (orders, for the nested reports).
    pub fn row_count(&self) -> usize {
        match self {
            ReportOutput::Customers(rows) => rows.len(),
            ReportOutput::OrderItemCounts(rows) => rows.len(),
            ReportOutput::ProductPrices(rows) => rows.len(),
            ReportOutput::OrderTotals(rows) => rows.len(),
            ReportOutput::CustomerOrderCounts(rows) => rows.len(),
            ReportOutput::TopCustomers(rows) => rows.len(),
            ReportOutput::RecentOrders(rows) => rows.len(),
            ReportOutput::ProductSales(rows) => rows.len(),
            ReportOutput::DiscountedOrders(rows) => rows.len(),
            ReportOutput::CategoryOrders(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Console lines, one per row plus one per nested product line.
    pub fn lines(&self) -> Vec<String> {
        match self {
            ReportOutput::Customers(rows) => rows
                .iter()
                .map(|c| format!("{} - {}", c.full_name, c.email))
                .collect(),
            ReportOutput::OrderItemCounts(rows) => rows
                .iter()
                .map(|o| {
                    format!(
                        "Order #{} | {} | Status: {} | Items: {}",
                        o.order_id, o.customer_name, o.status, o.item_count
                    )
                })
                .collect(),
            ReportOutput::ProductPrices(rows) => rows
                .iter()
                .map(|p| format!("{} - {}", p.product_name, p.price))
                .collect(),
            ReportOutput::OrderTotals(rows) => rows
                .iter()
                .map(|o| {
                    format!(
                        "Order #{} | {} | Date: {} | Total: {}",
                        o.order_id,
                        o.customer_name,
                        o.order_date.format(DATE_FORMAT),
                        o.total
                    )
                })
                .collect(),
            ReportOutput::CustomerOrderCounts(rows) => rows
                .iter()
                .map(|c| format!("{}: {} orders", c.customer_name, c.order_count))
                .collect(),
            ReportOutput::TopCustomers(rows) => rows
                .iter()
                .map(|c| format!("{} - Total: {}", c.customer_name, c.total_value))
                .collect(),
            ReportOutput::RecentOrders(rows) => rows
                .iter()
                .map(|o| {
                    format!(
                        "Order #{} | {} | {}",
                        o.order_id,
                        o.order_date.format(DATE_FORMAT),
                        o.customer_name
                    )
                })
                .collect(),
            ReportOutput::ProductSales(rows) => rows
                .iter()
                .map(|p| format!("{} - Sold: {}", p.product_name, p.total_sold))
                .collect(),
            ReportOutput::DiscountedOrders(rows) => {
                let mut lines = Vec::new();
                for order in rows {
                    lines.push(format!("Order #{} | {}", order.order_id, order.customer_name));
                    for item in &order.items {
                        lines.push(format!(
                            " - Discounted Product: {} | Discount: {}",
                            item.product_name, item.discount
                        ));
                    }
                }
                lines
            }
            ReportOutput::CategoryOrders(rows) => {
                let mut lines = Vec::new();
                for order in rows {
                    lines.push(format!(
                        "Order #{} | Customer: {}",
                        order.order_id, order.customer_name
                    ));
                    for product in &order.products {
                        let (store, quantity) = match &product.top_store {
                            Some(top) => (top.store_name.as_str(), top.quantity),
                            None => (NOT_AVAILABLE, 0),
                        };
                        lines.push(format!(
                            " - Product: {} | Top Store: {} ({} units)",
                            product.product_name, store, quantity
                        ));
                    }
                }
                lines
            }
        }
    }

    /// Writes [`lines`](Self::lines) to `out`, one per line.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        for line in self.lines() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}
