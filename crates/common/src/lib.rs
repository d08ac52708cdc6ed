//! Shared types for the shop reporting workspace.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{CategoryId, CustomerId, OrderId, OrderItemId, ProductId, StoreId};
