//! Rows of the shop schema as stored.

use chrono::{DateTime, Utc};
use common::{CategoryId, CustomerId, Money, OrderId, OrderItemId, ProductId, StoreId};
use serde::{Deserialize, Serialize};

/// A customer who places orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Customer {
    pub fn new(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: CustomerId::new(id),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// First and last name joined by a single space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An order placed by a customer.
///
/// The status is free text (e.g. `"Pending"`, `"Shipped"`) and is compared
/// exactly, including case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: String,
    pub order_date: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: i64,
        customer_id: i64,
        status: impl Into<String>,
        order_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(id),
            customer_id: CustomerId::new(customer_id),
            status: status.into(),
            order_date,
        }
    }
}

/// One product line within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub unit_price: Money,
    pub quantity: i32,
    /// Flat amount subtracted from the line total.
    pub discount: Money,
}

impl OrderItem {
    pub fn new(
        id: i64,
        order_id: i64,
        product_id: i64,
        unit_price: Money,
        quantity: i32,
        discount: Money,
    ) -> Self {
        Self {
            id: OrderItemId::new(id),
            order_id: OrderId::new(order_id),
            product_id: ProductId::new(product_id),
            unit_price,
            quantity,
            discount,
        }
    }

    /// `unit_price * quantity - discount`, `None` when it overflows.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price
            .checked_times(i64::from(self.quantity))?
            .checked_sub(self.discount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
}

impl Product {
    pub fn new(id: i64, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(id),
            name: name.into(),
        }
    }
}

/// Links a product to one of its categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductCategory {
    pub product_id: ProductId,
    pub category_id: CategoryId,
}

impl ProductCategory {
    pub fn new(product_id: i64, category_id: i64) -> Self {
        Self {
            product_id: ProductId::new(product_id),
            category_id: CategoryId::new(category_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
}

impl Store {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: StoreId::new(id),
            name: name.into(),
        }
    }
}

/// Quantity of a product held at a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub store_id: StoreId,
    pub product_id: ProductId,
    pub quantity: i32,
}

impl Stock {
    pub fn new(store_id: i64, product_id: i64, quantity: i32) -> Self {
        Self {
            store_id: StoreId::new(store_id),
            product_id: ProductId::new(product_id),
            quantity,
        }
    }
}
