//! Read-only data access for the shop schema.
//!
//! - [`ShopStore`] is the query interface every report is written against
//! - [`InMemoryShopStore`] answers the same queries from a [`Dataset`]
//! - [`PostgresShopStore`] answers them with SQL through sqlx

pub mod dataset;
pub mod entity;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod rows;
pub mod store;

pub use common::{CategoryId, CustomerId, Money, OrderId, OrderItemId, ProductId, StoreId};
pub use dataset::Dataset;
pub use entity::{Category, Customer, Order, OrderItem, Product, ProductCategory, Stock, Store};
pub use error::{Result, ShopStoreError};
pub use memory::InMemoryShopStore;
pub use postgres::PostgresShopStore;
pub use query::ReportQuery;
pub use rows::{
    CategoryOrder, CustomerContact, CustomerOrderCount, CustomerOrderValue, DiscountedItem,
    DiscountedOrder, OrderItemCount, OrderTotal, ProductPrice, ProductSales, ProductTopStock,
    RecentOrder, StoreStock,
};
pub use store::{ShopStore, ShopStoreExt};
