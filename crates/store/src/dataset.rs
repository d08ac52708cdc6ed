//! A complete, in-memory copy of the shop schema.

use std::collections::HashSet;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};
use common::Money;

use crate::entity::{Category, Customer, Order, OrderItem, Product, ProductCategory, Stock, Store};
use crate::{Result, ShopStoreError};

/// Every table of the shop schema.
///
/// Used to back [`InMemoryShopStore`](crate::InMemoryShopStore) and to seed a
/// PostgreSQL database. Call [`Dataset::validate`] before trusting one built
/// by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub product_categories: Vec<ProductCategory>,
    pub stores: Vec<Store>,
    pub stocks: Vec<Stock>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(mut self, customer: Customer) -> Self {
        self.customers.push(customer);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn order_item(mut self, item: OrderItem) -> Self {
        self.order_items.push(item);
        self
    }

    pub fn product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    /// Tags a product with a category.
    pub fn product_category(mut self, link: ProductCategory) -> Self {
        self.product_categories.push(link);
        self
    }

    pub fn store(mut self, store: Store) -> Self {
        self.stores.push(store);
        self
    }

    pub fn stock(mut self, stock: Stock) -> Self {
        self.stocks.push(stock);
        self
    }

    /// Checks identifier uniqueness, that every reference points at an
    /// existing row, and that amounts and stock levels are not negative.
    pub fn validate(&self) -> Result<()> {
        let customers = unique_ids("customer", self.customers.iter().map(|c| c.id))?;
        let orders = unique_ids("order", self.orders.iter().map(|o| o.id))?;
        let products = unique_ids("product", self.products.iter().map(|p| p.id))?;
        let categories = unique_ids("category", self.categories.iter().map(|c| c.id))?;
        let stores = unique_ids("store", self.stores.iter().map(|s| s.id))?;
        unique_ids("order item", self.order_items.iter().map(|i| i.id))?;
        unique_ids(
            "product category link",
            self.product_categories
                .iter()
                .map(|l| (l.product_id, l.category_id)),
        )?;
        unique_ids(
            "stock record",
            self.stocks.iter().map(|s| (s.store_id, s.product_id)),
        )?;

        for product in &self.products {
            if product.price.cents() < 0 {
                return Err(negative("product", product.id, "price", product.price));
            }
        }
        for order in &self.orders {
            if !customers.contains(&order.customer_id) {
                return Err(dangling("order", order.id, "customer", order.customer_id));
            }
        }
        for item in &self.order_items {
            if !orders.contains(&item.order_id) {
                return Err(dangling("order item", item.id, "order", item.order_id));
            }
            if !products.contains(&item.product_id) {
                return Err(dangling("order item", item.id, "product", item.product_id));
            }
            if item.quantity <= 0 {
                return Err(ShopStoreError::InvalidDataset(format!(
                    "order item {} has non-positive quantity {}",
                    item.id, item.quantity
                )));
            }
            if item.unit_price.cents() < 0 {
                return Err(negative("order item", item.id, "unit price", item.unit_price));
            }
            if item.discount.cents() < 0 {
                return Err(negative("order item", item.id, "discount", item.discount));
            }
        }
        for link in &self.product_categories {
            if !products.contains(&link.product_id) {
                return Err(dangling(
                    "category link of product",
                    link.product_id,
                    "product",
                    link.product_id,
                ));
            }
            if !categories.contains(&link.category_id) {
                return Err(dangling(
                    "category link of product",
                    link.product_id,
                    "category",
                    link.category_id,
                ));
            }
        }
        for stock in &self.stocks {
            if !stores.contains(&stock.store_id) {
                return Err(dangling(
                    "stock of product",
                    stock.product_id,
                    "store",
                    stock.store_id,
                ));
            }
            if !products.contains(&stock.product_id) {
                return Err(dangling(
                    "stock of product",
                    stock.product_id,
                    "product",
                    stock.product_id,
                ));
            }
            if stock.quantity < 0 {
                return Err(negative(
                    "stock of product",
                    stock.product_id,
                    "quantity",
                    stock.quantity,
                ));
            }
        }

        Ok(())
    }

    /// A small shop whose order dates are relative to `reference`.
    ///
    /// Contents:
    /// - five customers; Dave Brown has no orders
    /// - six orders, one of them with the lowercase status `"pending"`,
    ///   one dated exactly 30 days and one 31 days before `reference`
    /// - Headphones tagged both Electronics and Home
    /// - Laptop stocked at three stores, Headphones tied between two,
    ///   Smartwatch not stocked anywhere
    /// - Novel and Phone Case sharing the same price
    pub fn sample_at(reference: DateTime<Utc>) -> Self {
        let days_ago = |days: i64| reference - Duration::days(days);

        Self::new()
            .customer(Customer::new(1, "Alice", "Smith", "alice@example.com"))
            .customer(Customer::new(2, "Bob", "Jones", "bob@example.com"))
            .customer(Customer::new(3, "Carol", "White", "carol@example.com"))
            .customer(Customer::new(4, "Dave", "Brown", "dave@example.com"))
            .customer(Customer::new(5, "Erin", "Green", "erin@example.com"))
            .category(Category::new(1, "Electronics"))
            .category(Category::new(2, "Home"))
            .category(Category::new(3, "Books"))
            .product(Product::new(1, "Laptop", Money::from_dollars(1200)))
            .product(Product::new(2, "Headphones", Money::from_dollars(150)))
            .product(Product::new(3, "Coffee Maker", Money::from_dollars(80)))
            .product(Product::new(4, "Novel", Money::from_dollars(15)))
            .product(Product::new(5, "Phone Case", Money::from_dollars(15)))
            .product(Product::new(6, "Smartwatch", Money::from_dollars(250)))
            .product_category(ProductCategory::new(1, 1))
            .product_category(ProductCategory::new(2, 1))
            .product_category(ProductCategory::new(2, 2))
            .product_category(ProductCategory::new(3, 2))
            .product_category(ProductCategory::new(4, 3))
            .product_category(ProductCategory::new(6, 1))
            .store(Store::new(1, "Downtown"))
            .store(Store::new(2, "Airport"))
            .store(Store::new(3, "Mall"))
            .stock(Stock::new(1, 1, 5))
            .stock(Stock::new(2, 1, 12))
            .stock(Stock::new(3, 1, 3))
            .stock(Stock::new(1, 2, 20))
            .stock(Stock::new(3, 2, 20))
            .stock(Stock::new(3, 3, 7))
            .stock(Stock::new(1, 4, 30))
            .order(Order::new(101, 1, "Pending", days_ago(2)))
            .order(Order::new(102, 1, "Shipped", days_ago(30)))
            .order(Order::new(103, 2, "pending", days_ago(31)))
            .order(Order::new(104, 2, "Pending", days_ago(10)))
            .order(Order::new(105, 3, "Completed", days_ago(60)))
            .order(Order::new(106, 5, "Completed", days_ago(45)))
            .order_item(OrderItem::new(
                1001,
                101,
                1,
                Money::from_dollars(1200),
                1,
                Money::from_dollars(100),
            ))
            .order_item(OrderItem::new(
                1002,
                101,
                2,
                Money::from_dollars(150),
                2,
                Money::zero(),
            ))
            .order_item(OrderItem::new(
                1003,
                102,
                4,
                Money::from_dollars(15),
                3,
                Money::zero(),
            ))
            .order_item(OrderItem::new(
                1004,
                103,
                3,
                Money::from_dollars(80),
                1,
                Money::from_dollars(5),
            ))
            .order_item(OrderItem::new(
                1005,
                104,
                4,
                Money::from_dollars(15),
                2,
                Money::zero(),
            ))
            .order_item(OrderItem::new(
                1006,
                104,
                5,
                Money::from_dollars(15),
                4,
                Money::zero(),
            ))
            .order_item(OrderItem::new(
                1007,
                105,
                2,
                Money::from_dollars(150),
                1,
                Money::from_dollars(10),
            ))
            .order_item(OrderItem::new(
                1008,
                105,
                3,
                Money::from_dollars(80),
                2,
                Money::zero(),
            ))
            .order_item(OrderItem::new(
                1009,
                106,
                6,
                Money::from_dollars(250),
                1,
                Money::zero(),
            ))
    }
}

fn unique_ids<T, I>(kind: &str, ids: I) -> Result<HashSet<T>>
where
    T: Eq + Hash + std::fmt::Debug,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if seen.contains(&id) {
            return Err(ShopStoreError::InvalidDataset(format!(
                "duplicate {kind} id {id:?}"
            )));
        }
        seen.insert(id);
    }
    Ok(seen)
}

fn negative(
    kind: &str,
    id: impl std::fmt::Display,
    field: &str,
    value: impl std::fmt::Display,
) -> ShopStoreError {
    ShopStoreError::InvalidDataset(format!("{kind} {id} has negative {field} {value}"))
}

fn dangling(
    kind: &str,
    id: impl std::fmt::Display,
    target: &str,
    target_id: impl std::fmt::Display,
) -> ShopStoreError {
    ShopStoreError::InvalidDataset(format!(
        "{kind} {id} references missing {target} {target_id}"
    ))
}
