//! Named result rows, one shape per report.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId, StoreId};
use serde::{Deserialize, Serialize};

/// A customer's display name and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub email: String,
}

/// An order with the total quantity of items on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemCount {
    pub order_id: OrderId,
    pub customer_name: String,
    pub status: String,
    pub item_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPrice {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Money,
}

/// An order with its derived total (sum of line totals).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotal {
    pub order_id: OrderId,
    pub customer_name: String,
    pub order_date: DateTime<Utc>,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerOrderCount {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub order_count: i64,
}

/// Lifetime order value of a customer. Zero when the customer has no orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerOrderValue {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub total_value: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentOrder {
    pub order_id: OrderId,
    pub order_date: DateTime<Utc>,
    pub customer_name: String,
}

/// Units of a product sold across all orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_id: ProductId,
    pub product_name: String,
    pub total_sold: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountedItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub discount: Money,
}

/// An order with at least one discounted line, listing only those lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountedOrder {
    pub order_id: OrderId,
    pub customer_name: String,
    pub items: Vec<DiscountedItem>,
}

/// The store holding the most units of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStock {
    pub store_id: StoreId,
    pub store_name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTopStock {
    pub product_id: ProductId,
    pub product_name: String,
    /// `None` when no store stocks the product.
    pub top_store: Option<StoreStock>,
}

/// An order containing products of a category, with stock info for each of
/// those products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOrder {
    pub order_id: OrderId,
    pub customer_name: String,
    pub products: Vec<ProductTopStock>,
}
