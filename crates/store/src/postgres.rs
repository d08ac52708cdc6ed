use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId, StoreId};
use futures_util::TryStreamExt;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::dataset::Dataset;
use crate::rows::{
    CategoryOrder, CustomerContact, CustomerOrderCount, CustomerOrderValue, DiscountedItem,
    DiscountedOrder, OrderItemCount, OrderTotal, ProductPrice, ProductSales, ProductTopStock,
    RecentOrder, StoreStock,
};
use crate::{Result, ShopStore};

/// `unit_price * quantity - discount`, summed over the joined `oi` rows.
/// Zero when the join produced no items.
const LINE_TOTAL_SUM: &str =
    "COALESCE(SUM(oi.unit_price_cents * oi.quantity - oi.discount_cents), 0)::BIGINT";

/// PostgreSQL-backed shop store.
#[derive(Clone)]
pub struct PostgresShopStore {
    pool: PgPool,
}

impl PostgresShopStore {
    /// Creates a new PostgreSQL shop store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the shop tables if they do not exist.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Inserts every row of a validated dataset in one transaction.
    pub async fn load_dataset(&self, dataset: &Dataset) -> Result<()> {
        dataset.validate()?;

        let mut tx = self.pool.begin().await?;

        for customer in &dataset.customers {
            sqlx::query(
                "INSERT INTO customers (customer_id, first_name, last_name, email) VALUES ($1, $2, $3, $4)",
            )
            .bind(customer.id.as_i64())
            .bind(&customer.first_name)
            .bind(&customer.last_name)
            .bind(&customer.email)
            .execute(&mut *tx)
            .await?;
        }

        for product in &dataset.products {
            sqlx::query(
                "INSERT INTO products (product_id, product_name, price_cents) VALUES ($1, $2, $3)",
            )
            .bind(product.id.as_i64())
            .bind(&product.name)
            .bind(product.price.cents())
            .execute(&mut *tx)
            .await?;
        }

        for category in &dataset.categories {
            sqlx::query("INSERT INTO categories (category_id, category_name) VALUES ($1, $2)")
                .bind(category.id.as_i64())
                .bind(&category.name)
                .execute(&mut *tx)
                .await?;
        }

        for link in &dataset.product_categories {
            sqlx::query("INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2)")
                .bind(link.product_id.as_i64())
                .bind(link.category_id.as_i64())
                .execute(&mut *tx)
                .await?;
        }

        for store in &dataset.stores {
            sqlx::query("INSERT INTO stores (store_id, store_name) VALUES ($1, $2)")
                .bind(store.id.as_i64())
                .bind(&store.name)
                .execute(&mut *tx)
                .await?;
        }

        for stock in &dataset.stocks {
            sqlx::query(
                "INSERT INTO stocks (store_id, product_id, quantity_in_stock) VALUES ($1, $2, $3)",
            )
            .bind(stock.store_id.as_i64())
            .bind(stock.product_id.as_i64())
            .bind(stock.quantity)
            .execute(&mut *tx)
            .await?;
        }

        for order in &dataset.orders {
            sqlx::query(
                "INSERT INTO orders (order_id, customer_id, order_status, order_date) VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id.as_i64())
            .bind(order.customer_id.as_i64())
            .bind(&order.status)
            .bind(order.order_date)
            .execute(&mut *tx)
            .await?;
        }

        for item in &dataset.order_items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_item_id, order_id, product_id, unit_price_cents, quantity, discount_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.id.as_i64())
            .bind(item.order_id.as_i64())
            .bind(item.product_id.as_i64())
            .bind(item.unit_price.cents())
            .bind(item.quantity)
            .bind(item.discount.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(
            customers = dataset.customers.len(),
            orders = dataset.orders.len(),
            order_items = dataset.order_items.len(),
            "dataset loaded"
        );
        Ok(())
    }

    /// Whether none of the shop tables hold rows.
    pub async fn is_empty(&self) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT NOT (
                EXISTS (SELECT 1 FROM customers)
                OR EXISTS (SELECT 1 FROM products)
                OR EXISTS (SELECT 1 FROM categories)
                OR EXISTS (SELECT 1 FROM stores)
            ) AS empty
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("empty")?)
    }

    /// Loads `dataset` only into an empty database, so repeated runs can
    /// seed without tripping over existing keys.
    ///
    /// Returns whether the dataset was loaded.
    pub async fn load_dataset_if_empty(&self, dataset: &Dataset) -> Result<bool> {
        if !self.is_empty().await? {
            tracing::info!("database already holds shop data, skipping dataset load");
            return Ok(false);
        }
        self.load_dataset(dataset).await?;
        Ok(true)
    }

    /// Highest-stocked store per product, ties to the lowest store id.
    async fn top_stores(&self, product_ids: Vec<i64>) -> Result<HashMap<ProductId, StoreStock>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ON (s.product_id)
                s.product_id, st.store_id, st.store_name, s.quantity_in_stock
            FROM stocks s
            JOIN stores st ON st.store_id = s.store_id
            WHERE s.product_id = ANY($1)
            ORDER BY s.product_id, s.quantity_in_stock DESC, s.store_id ASC
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_top_store).collect()
    }
}

fn row_to_top_store(row: PgRow) -> Result<(ProductId, StoreStock)> {
    Ok((
        ProductId::new(row.try_get("product_id")?),
        StoreStock {
            store_id: StoreId::new(row.try_get("store_id")?),
            store_name: row.try_get("store_name")?,
            quantity: row.try_get("quantity_in_stock")?,
        },
    ))
}

fn row_to_customer_contact(row: PgRow) -> Result<CustomerContact> {
    Ok(CustomerContact {
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
    })
}

fn row_to_order_item_count(row: PgRow) -> Result<OrderItemCount> {
    Ok(OrderItemCount {
        order_id: OrderId::new(row.try_get("order_id")?),
        customer_name: row.try_get("customer_name")?,
        status: row.try_get("order_status")?,
        item_count: row.try_get("item_count")?,
    })
}

fn row_to_product_price(row: PgRow) -> Result<ProductPrice> {
    Ok(ProductPrice {
        product_id: ProductId::new(row.try_get("product_id")?),
        product_name: row.try_get("product_name")?,
        price: Money::from_cents(row.try_get("price_cents")?),
    })
}

fn row_to_order_total(row: PgRow) -> Result<OrderTotal> {
    Ok(OrderTotal {
        order_id: OrderId::new(row.try_get("order_id")?),
        customer_name: row.try_get("customer_name")?,
        order_date: row.try_get("order_date")?,
        total: Money::from_cents(row.try_get("total_cents")?),
    })
}

fn row_to_customer_order_count(row: PgRow) -> Result<CustomerOrderCount> {
    Ok(CustomerOrderCount {
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        customer_name: row.try_get("customer_name")?,
        order_count: row.try_get("order_count")?,
    })
}

fn row_to_customer_order_value(row: PgRow) -> Result<CustomerOrderValue> {
    Ok(CustomerOrderValue {
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        customer_name: row.try_get("customer_name")?,
        total_value: Money::from_cents(row.try_get("total_cents")?),
    })
}

fn row_to_recent_order(row: PgRow) -> Result<RecentOrder> {
    Ok(RecentOrder {
        order_id: OrderId::new(row.try_get("order_id")?),
        order_date: row.try_get("order_date")?,
        customer_name: row.try_get("customer_name")?,
    })
}

fn row_to_product_sales(row: PgRow) -> Result<ProductSales> {
    Ok(ProductSales {
        product_id: ProductId::new(row.try_get("product_id")?),
        product_name: row.try_get("product_name")?,
        total_sold: row.try_get("total_sold")?,
    })
}

/// Appends a row to the last order when it belongs to it, otherwise starts
/// a new order. Rows must arrive sorted by order id.
fn push_discounted(orders: &mut Vec<DiscountedOrder>, row: &PgRow) -> sqlx::Result<()> {
    let order_id = OrderId::new(row.try_get("order_id")?);
    let item = DiscountedItem {
        product_id: ProductId::new(row.try_get("product_id")?),
        product_name: row.try_get("product_name")?,
        discount: Money::from_cents(row.try_get("discount_cents")?),
    };

    match orders.last_mut() {
        Some(order) if order.order_id == order_id => order.items.push(item),
        _ => orders.push(DiscountedOrder {
            order_id,
            customer_name: row.try_get("customer_name")?,
            items: vec![item],
        }),
    }
    Ok(())
}

/// Same grouping as [`push_discounted`], stock lookup left for later.
fn push_category_product(orders: &mut Vec<CategoryOrder>, row: &PgRow) -> sqlx::Result<()> {
    let order_id = OrderId::new(row.try_get("order_id")?);
    let product = ProductTopStock {
        product_id: ProductId::new(row.try_get("product_id")?),
        product_name: row.try_get("product_name")?,
        top_store: None,
    };

    match orders.last_mut() {
        Some(order) if order.order_id == order_id => order.products.push(product),
        _ => orders.push(CategoryOrder {
            order_id,
            customer_name: row.try_get("customer_name")?,
            products: vec![product],
        }),
    }
    Ok(())
}

#[async_trait]
impl ShopStore for PostgresShopStore {
    async fn list_customers(&self) -> Result<Vec<CustomerContact>> {
        let rows = sqlx::query(
            r#"
            SELECT customer_id, first_name || ' ' || last_name AS full_name, email
            FROM customers
            ORDER BY customer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_customer_contact).collect()
    }

    async fn orders_with_item_counts(&self) -> Result<Vec<OrderItemCount>> {
        let rows = sqlx::query(
            r#"
            SELECT o.order_id,
                   c.first_name || ' ' || c.last_name AS customer_name,
                   o.order_status,
                   COALESCE(SUM(oi.quantity), 0)::BIGINT AS item_count
            FROM orders o
            JOIN customers c ON c.customer_id = o.customer_id
            LEFT JOIN order_items oi ON oi.order_id = o.order_id
            GROUP BY o.order_id, c.first_name, c.last_name, o.order_status
            ORDER BY o.order_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_order_item_count).collect()
    }

    async fn products_by_price_desc(&self) -> Result<Vec<ProductPrice>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, product_name, price_cents
            FROM products
            ORDER BY price_cents DESC, product_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_product_price).collect()
    }

    async fn orders_with_status_totals(&self, status: &str) -> Result<Vec<OrderTotal>> {
        let sql = format!(
            r#"
            SELECT o.order_id,
                   c.first_name || ' ' || c.last_name AS customer_name,
                   o.order_date,
                   {LINE_TOTAL_SUM} AS total_cents
            FROM orders o
            JOIN customers c ON c.customer_id = o.customer_id
            LEFT JOIN order_items oi ON oi.order_id = o.order_id
            WHERE o.order_status = $1
            GROUP BY o.order_id, c.first_name, c.last_name, o.order_date
            ORDER BY o.order_id
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_order_total).collect()
    }

    async fn order_counts_per_customer(&self) -> Result<Vec<CustomerOrderCount>> {
        let rows = sqlx::query(
            r#"
            SELECT c.customer_id,
                   c.first_name || ' ' || c.last_name AS customer_name,
                   COUNT(*) AS order_count
            FROM orders o
            JOIN customers c ON c.customer_id = o.customer_id
            GROUP BY c.customer_id, c.first_name, c.last_name
            ORDER BY c.customer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_customer_order_count).collect()
    }

    async fn top_customers_by_value(&self, limit: usize) -> Result<Vec<CustomerOrderValue>> {
        let sql = format!(
            r#"
            SELECT c.customer_id,
                   c.first_name || ' ' || c.last_name AS customer_name,
                   {LINE_TOTAL_SUM} AS total_cents
            FROM customers c
            LEFT JOIN orders o ON o.customer_id = c.customer_id
            LEFT JOIN order_items oi ON oi.order_id = o.order_id
            GROUP BY c.customer_id, c.first_name, c.last_name
            ORDER BY total_cents DESC, c.customer_id ASC
            LIMIT $1
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_customer_order_value).collect()
    }

    async fn orders_placed_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<RecentOrder>> {
        let rows = sqlx::query(
            r#"
            SELECT o.order_id, o.order_date, c.first_name || ' ' || c.last_name AS customer_name
            FROM orders o
            JOIN customers c ON c.customer_id = o.customer_id
            WHERE o.order_date >= $1
            ORDER BY o.order_id
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_recent_order).collect()
    }

    async fn units_sold_per_product(&self) -> Result<Vec<ProductSales>> {
        let rows = sqlx::query(
            r#"
            SELECT p.product_id, p.product_name, SUM(oi.quantity)::BIGINT AS total_sold
            FROM order_items oi
            JOIN products p ON p.product_id = oi.product_id
            GROUP BY p.product_id, p.product_name
            ORDER BY total_sold DESC, p.product_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_product_sales).collect()
    }

    async fn discounted_orders(&self) -> Result<Vec<DiscountedOrder>> {
        let orders = sqlx::query(
            r#"
            SELECT o.order_id,
                   c.first_name || ' ' || c.last_name AS customer_name,
                   p.product_id,
                   p.product_name,
                   oi.discount_cents
            FROM orders o
            JOIN customers c ON c.customer_id = o.customer_id
            JOIN order_items oi ON oi.order_id = o.order_id
            JOIN products p ON p.product_id = oi.product_id
            WHERE oi.discount_cents > 0
            ORDER BY o.order_id, oi.order_item_id
            "#,
        )
        .fetch(&self.pool)
        .try_fold(Vec::new(), |mut orders, row| async move {
            push_discounted(&mut orders, &row)?;
            Ok::<_, sqlx::Error>(orders)
        })
        .await?;

        Ok(orders)
    }

    async fn category_orders_with_top_stock(
        &self,
        category: &str,
    ) -> Result<Vec<CategoryOrder>> {
        let mut orders = sqlx::query(
            r#"
            SELECT o.order_id,
                   c.first_name || ' ' || c.last_name AS customer_name,
                   p.product_id,
                   p.product_name
            FROM orders o
            JOIN customers c ON c.customer_id = o.customer_id
            JOIN order_items oi ON oi.order_id = o.order_id
            JOIN products p ON p.product_id = oi.product_id
            WHERE EXISTS (
                SELECT 1
                FROM product_categories pc
                JOIN categories cat ON cat.category_id = pc.category_id
                WHERE pc.product_id = p.product_id AND cat.category_name = $1
            )
            ORDER BY o.order_id, oi.order_item_id
            "#,
        )
        .bind(category)
        .fetch(&self.pool)
        .try_fold(Vec::new(), |mut orders, row| async move {
            push_category_product(&mut orders, &row)?;
            Ok::<_, sqlx::Error>(orders)
        })
        .await?;

        if orders.is_empty() {
            return Ok(orders);
        }

        let mut product_ids: Vec<i64> = orders
            .iter()
            .flat_map(|o| o.products.iter().map(|p| p.product_id.as_i64()))
            .collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        tracing::debug!(
            orders = orders.len(),
            products = product_ids.len(),
            category,
            "looking up top stocking stores"
        );

        let top_stores = self.top_stores(product_ids).await?;
        for product in orders.iter_mut().flat_map(|o| o.products.iter_mut()) {
            product.top_store = top_stores.get(&product.product_id).cloned();
        }

        Ok(orders)
    }
}
