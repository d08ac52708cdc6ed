use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::query::{
    DEFAULT_RECENT_WINDOW_DAYS, DEFAULT_TOP_CUSTOMERS, ELECTRONICS_CATEGORY, PENDING_STATUS,
    recent_cutoff,
};
use crate::rows::{
    CategoryOrder, CustomerContact, CustomerOrderCount, CustomerOrderValue, DiscountedOrder,
    OrderItemCount, OrderTotal, ProductPrice, ProductSales, RecentOrder,
};

/// Read-only query interface over the shop schema.
///
/// Each method answers one report. Implementations must agree on row
/// contents and on ordering: wherever a sort key can tie, rows fall back to
/// ascending identifier order, and unsorted listings are returned in
/// identifier order. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Every customer's full name and email.
    async fn list_customers(&self) -> Result<Vec<CustomerContact>>;

    /// Every order with its customer, status and total item quantity.
    ///
    /// An order without items has an item count of zero.
    async fn orders_with_item_counts(&self) -> Result<Vec<OrderItemCount>>;

    /// All products, most expensive first.
    async fn products_by_price_desc(&self) -> Result<Vec<ProductPrice>>;

    /// Orders whose status equals `status` exactly, with their totals.
    async fn orders_with_status_totals(&self, status: &str) -> Result<Vec<OrderTotal>>;

    /// Number of orders per customer.
    ///
    /// Grouped from orders, so customers who never ordered are absent.
    async fn order_counts_per_customer(&self) -> Result<Vec<CustomerOrderCount>>;

    /// The `limit` customers with the highest lifetime order value.
    ///
    /// Every customer is a candidate; one without orders has a value of zero.
    async fn top_customers_by_value(&self, limit: usize) -> Result<Vec<CustomerOrderValue>>;

    /// Orders dated on or after `cutoff`.
    async fn orders_placed_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<RecentOrder>>;

    /// Units sold per product, best sellers first.
    ///
    /// Grouped from order items, so products never sold are absent.
    async fn units_sold_per_product(&self) -> Result<Vec<ProductSales>>;

    /// Orders having at least one item with a positive discount, listing
    /// only the discounted items.
    async fn discounted_orders(&self) -> Result<Vec<DiscountedOrder>>;

    /// Orders containing products of `category`, each such product paired
    /// with the store holding the most of it (ties go to the lowest store id).
    async fn category_orders_with_top_stock(&self, category: &str)
    -> Result<Vec<CategoryOrder>>;
}

/// Extension trait with the standard parameters of the reports.
#[async_trait]
pub trait ShopStoreExt: ShopStore {
    /// Orders with status `"Pending"` and their totals.
    async fn pending_orders(&self) -> Result<Vec<OrderTotal>> {
        self.orders_with_status_totals(PENDING_STATUS).await
    }

    /// The three customers with the highest order value.
    async fn top_three_customers(&self) -> Result<Vec<CustomerOrderValue>> {
        self.top_customers_by_value(DEFAULT_TOP_CUSTOMERS).await
    }

    /// Orders placed in the 30 days up to and including `now`.
    async fn recent_orders(&self, now: DateTime<Utc>) -> Result<Vec<RecentOrder>> {
        self.orders_placed_since(recent_cutoff(now, DEFAULT_RECENT_WINDOW_DAYS))
            .await
    }

    /// Orders containing Electronics products, with top stocking stores.
    async fn electronics_orders(&self) -> Result<Vec<CategoryOrder>> {
        self.category_orders_with_top_stock(ELECTRONICS_CATEGORY)
            .await
    }
}

// Blanket implementation for all ShopStore implementations
impl<T: ShopStore + ?Sized> ShopStoreExt for T {}
