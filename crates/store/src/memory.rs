use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId};
use tokio::sync::RwLock;

use crate::dataset::Dataset;
use crate::entity::{Customer, OrderItem, Product};
use crate::rows::{
    CategoryOrder, CustomerContact, CustomerOrderCount, CustomerOrderValue, DiscountedItem,
    DiscountedOrder, OrderItemCount, OrderTotal, ProductPrice, ProductSales, ProductTopStock,
    RecentOrder, StoreStock,
};
use crate::{Result, ShopStore, ShopStoreError};

/// In-memory shop store.
///
/// Answers the same queries as the PostgreSQL implementation from a
/// [`Dataset`], with the same join semantics: a row whose reference cannot
/// be resolved is dropped, as an inner join would drop it.
#[derive(Clone, Default)]
pub struct InMemoryShopStore {
    dataset: Arc<RwLock<Dataset>>,
}

impl InMemoryShopStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store over a validated dataset.
    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        dataset.validate()?;
        Ok(Self {
            dataset: Arc::new(RwLock::new(dataset)),
        })
    }

    /// Creates a store over [`Dataset::sample_at`].
    pub fn sample_at(reference: DateTime<Utc>) -> Self {
        Self {
            dataset: Arc::new(RwLock::new(Dataset::sample_at(reference))),
        }
    }

    /// Swaps in a new validated dataset.
    pub async fn replace(&self, dataset: Dataset) -> Result<()> {
        dataset.validate()?;
        *self.dataset.write().await = dataset;
        Ok(())
    }

    /// Returns a copy of the current dataset.
    pub async fn snapshot(&self) -> Dataset {
        self.dataset.read().await.clone()
    }
}

/// Lookup tables over a borrowed dataset.
struct Index<'a> {
    customers: HashMap<CustomerId, &'a Customer>,
    products: HashMap<ProductId, &'a Product>,
    items_by_order: HashMap<OrderId, Vec<&'a OrderItem>>,
}

impl<'a> Index<'a> {
    fn new(dataset: &'a Dataset) -> Self {
        let mut items_by_order: HashMap<OrderId, Vec<&OrderItem>> = HashMap::new();
        for item in &dataset.order_items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }
        for items in items_by_order.values_mut() {
            items.sort_by_key(|i| i.id);
        }

        Self {
            customers: dataset.customers.iter().map(|c| (c.id, c)).collect(),
            products: dataset.products.iter().map(|p| (p.id, p)).collect(),
            items_by_order,
        }
    }

    fn customer_name(&self, id: CustomerId) -> Option<String> {
        self.customers.get(&id).map(|c| c.full_name())
    }

    /// Items of an order whose product exists, in item id order.
    fn items(&self, order_id: OrderId) -> impl Iterator<Item = (&'a OrderItem, &'a Product)> + '_ {
        self.items_by_order
            .get(&order_id)
            .into_iter()
            .flatten()
            .filter_map(|item| self.products.get(&item.product_id).map(|p| (*item, *p)))
    }

    /// Sum of line totals; overflow is an error, as it is in PostgreSQL.
    fn order_total(&self, order_id: OrderId) -> Result<Money> {
        self.items(order_id)
            .try_fold(Money::zero(), |total, (item, _)| {
                total.checked_add(item.line_total()?)
            })
            .ok_or_else(|| {
                ShopStoreError::AmountOutOfRange(format!("total of order {order_id}"))
            })
    }
}

/// Orders sorted by id.
fn orders_by_id(dataset: &Dataset) -> Vec<&crate::entity::Order> {
    let mut orders: Vec<_> = dataset.orders.iter().collect();
    orders.sort_by_key(|o| o.id);
    orders
}

#[async_trait]
impl ShopStore for InMemoryShopStore {
    async fn list_customers(&self) -> Result<Vec<CustomerContact>> {
        let dataset = self.dataset.read().await;
        let mut rows: Vec<_> = dataset
            .customers
            .iter()
            .map(|c| CustomerContact {
                customer_id: c.id,
                full_name: c.full_name(),
                email: c.email.clone(),
            })
            .collect();
        rows.sort_by_key(|r| r.customer_id);
        Ok(rows)
    }

    async fn orders_with_item_counts(&self) -> Result<Vec<OrderItemCount>> {
        let dataset = self.dataset.read().await;
        let index = Index::new(&dataset);

        Ok(orders_by_id(&dataset)
            .into_iter()
            .filter_map(|order| {
                let customer_name = index.customer_name(order.customer_id)?;
                let item_count: i64 = index
                    .items(order.id)
                    .map(|(item, _)| i64::from(item.quantity))
                    .sum();
                Some(OrderItemCount {
                    order_id: order.id,
                    customer_name,
                    status: order.status.clone(),
                    item_count,
                })
            })
            .collect())
    }

    async fn products_by_price_desc(&self) -> Result<Vec<ProductPrice>> {
        let dataset = self.dataset.read().await;
        let mut rows: Vec<_> = dataset
            .products
            .iter()
            .map(|p| ProductPrice {
                product_id: p.id,
                product_name: p.name.clone(),
                price: p.price,
            })
            .collect();
        rows.sort_by_key(|r| (Reverse(r.price), r.product_id));
        Ok(rows)
    }

    async fn orders_with_status_totals(&self, status: &str) -> Result<Vec<OrderTotal>> {
        let dataset = self.dataset.read().await;
        let index = Index::new(&dataset);

        let mut rows = Vec::new();
        for order in orders_by_id(&dataset) {
            if order.status != status {
                continue;
            }
            let Some(customer_name) = index.customer_name(order.customer_id) else {
                continue;
            };
            rows.push(OrderTotal {
                order_id: order.id,
                customer_name,
                order_date: order.order_date,
                total: index.order_total(order.id)?,
            });
        }
        Ok(rows)
    }

    async fn order_counts_per_customer(&self) -> Result<Vec<CustomerOrderCount>> {
        let dataset = self.dataset.read().await;
        let index = Index::new(&dataset);

        let mut counts: BTreeMap<CustomerId, i64> = BTreeMap::new();
        for order in &dataset.orders {
            *counts.entry(order.customer_id).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .filter_map(|(customer_id, order_count)| {
                Some(CustomerOrderCount {
                    customer_id,
                    customer_name: index.customer_name(customer_id)?,
                    order_count,
                })
            })
            .collect())
    }

    async fn top_customers_by_value(&self, limit: usize) -> Result<Vec<CustomerOrderValue>> {
        let dataset = self.dataset.read().await;
        let index = Index::new(&dataset);

        let mut totals: HashMap<CustomerId, Money> = HashMap::new();
        for order in &dataset.orders {
            let order_total = index.order_total(order.id)?;
            let entry = totals.entry(order.customer_id).or_default();
            *entry = entry.checked_add(order_total).ok_or_else(|| {
                ShopStoreError::AmountOutOfRange(format!(
                    "order value of customer {}",
                    order.customer_id
                ))
            })?;
        }

        let mut rows: Vec<_> = dataset
            .customers
            .iter()
            .map(|c| CustomerOrderValue {
                customer_id: c.id,
                customer_name: c.full_name(),
                total_value: totals.get(&c.id).copied().unwrap_or_default(),
            })
            .collect();
        rows.sort_by_key(|r| (Reverse(r.total_value), r.customer_id));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn orders_placed_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<RecentOrder>> {
        let dataset = self.dataset.read().await;
        let index = Index::new(&dataset);

        Ok(orders_by_id(&dataset)
            .into_iter()
            .filter(|order| order.order_date >= cutoff)
            .filter_map(|order| {
                Some(RecentOrder {
                    order_id: order.id,
                    order_date: order.order_date,
                    customer_name: index.customer_name(order.customer_id)?,
                })
            })
            .collect())
    }

    async fn units_sold_per_product(&self) -> Result<Vec<ProductSales>> {
        let dataset = self.dataset.read().await;
        let index = Index::new(&dataset);

        let mut sold: HashMap<ProductId, i64> = HashMap::new();
        for item in &dataset.order_items {
            *sold.entry(item.product_id).or_default() += i64::from(item.quantity);
        }

        let mut rows: Vec<_> = sold
            .into_iter()
            .filter_map(|(product_id, total_sold)| {
                Some(ProductSales {
                    product_id,
                    product_name: index.products.get(&product_id)?.name.clone(),
                    total_sold,
                })
            })
            .collect();
        rows.sort_by_key(|r| (Reverse(r.total_sold), r.product_id));
        Ok(rows)
    }

    async fn discounted_orders(&self) -> Result<Vec<DiscountedOrder>> {
        let dataset = self.dataset.read().await;
        let index = Index::new(&dataset);

        Ok(orders_by_id(&dataset)
            .into_iter()
            .filter_map(|order| {
                let items: Vec<_> = index
                    .items(order.id)
                    .filter(|(item, _)| item.discount.is_positive())
                    .map(|(item, product)| DiscountedItem {
                        product_id: product.id,
                        product_name: product.name.clone(),
                        discount: item.discount,
                    })
                    .collect();
                if items.is_empty() {
                    return None;
                }
                Some(DiscountedOrder {
                    order_id: order.id,
                    customer_name: index.customer_name(order.customer_id)?,
                    items,
                })
            })
            .collect())
    }

    async fn category_orders_with_top_stock(
        &self,
        category: &str,
    ) -> Result<Vec<CategoryOrder>> {
        let dataset = self.dataset.read().await;
        let index = Index::new(&dataset);

        let category_ids: HashSet<_> = dataset
            .categories
            .iter()
            .filter(|c| c.name == category)
            .map(|c| c.id)
            .collect();
        let tagged: HashSet<ProductId> = dataset
            .product_categories
            .iter()
            .filter(|link| category_ids.contains(&link.category_id))
            .map(|link| link.product_id)
            .collect();

        let stores: HashMap<_, _> = dataset.stores.iter().map(|s| (s.id, s)).collect();
        let top_store = |product_id: ProductId| {
            dataset
                .stocks
                .iter()
                .filter(|stock| stock.product_id == product_id)
                .filter_map(|stock| stores.get(&stock.store_id).map(|store| (stock, *store)))
                .min_by_key(|(stock, _)| (Reverse(stock.quantity), stock.store_id))
                .map(|(stock, store)| StoreStock {
                    store_id: store.id,
                    store_name: store.name.clone(),
                    quantity: stock.quantity,
                })
        };

        Ok(orders_by_id(&dataset)
            .into_iter()
            .filter_map(|order| {
                let products: Vec<_> = index
                    .items(order.id)
                    .filter(|(_, product)| tagged.contains(&product.id))
                    .map(|(_, product)| ProductTopStock {
                        product_id: product.id,
                        product_name: product.name.clone(),
                        top_store: top_store(product.id),
                    })
                    .collect();
                if products.is_empty() {
                    return None;
                }
                Some(CategoryOrder {
                    order_id: order.id,
                    customer_name: index.customer_name(order.customer_id)?,
                    products,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use common::StoreId;

    use super::*;
    use crate::ShopStoreExt;
    use crate::entity::{Customer, Order, OrderItem};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn sample_store() -> InMemoryShopStore {
        InMemoryShopStore::sample_at(reference())
    }

    fn order_ids<T>(rows: &[T], id: impl Fn(&T) -> OrderId) -> Vec<i64> {
        rows.iter().map(|r| id(r).as_i64()).collect()
    }

    #[tokio::test]
    async fn lists_every_customer_with_email() {
        let store = sample_store();
        let dataset = store.snapshot().await;

        let rows = store.list_customers().await.unwrap();

        assert_eq!(rows.len(), dataset.customers.len());
        for (row, seed) in rows.iter().zip(&dataset.customers) {
            assert_eq!(row.customer_id, seed.id);
            assert_eq!(row.email, seed.email);
        }
        assert_eq!(rows[0].full_name, "Alice Smith");
    }

    #[tokio::test]
    async fn item_counts_sum_quantities() {
        let rows = sample_store().orders_with_item_counts().await.unwrap();

        let counts: Vec<_> = rows
            .iter()
            .map(|r| (r.order_id.as_i64(), r.item_count))
            .collect();
        assert_eq!(
            counts,
            vec![(101, 3), (102, 3), (103, 1), (104, 6), (105, 3), (106, 1)]
        );
        assert_eq!(rows[3].customer_name, "Bob Jones");
        assert_eq!(rows[3].status, "Pending");
    }

    #[tokio::test]
    async fn order_without_items_counts_zero() {
        let dataset = Dataset::new()
            .customer(Customer::new(1, "Ann", "Lee", "ann@example.com"))
            .order(Order::new(1, 1, "Pending", reference()));
        let store = InMemoryShopStore::from_dataset(dataset).unwrap();

        let rows = store.orders_with_item_counts().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_count, 0);
    }

    #[tokio::test]
    async fn overflowing_totals_are_errors() {
        let dataset = Dataset::new()
            .customer(Customer::new(1, "Ann", "Lee", "ann@example.com"))
            .product(Product::new(1, "Yacht", Money::from_cents(i64::MAX / 2)))
            .order(Order::new(1, 1, "Pending", reference()))
            .order_item(OrderItem::new(
                1,
                1,
                1,
                Money::from_cents(i64::MAX / 2),
                3,
                Money::zero(),
            ));
        let store = InMemoryShopStore::from_dataset(dataset).unwrap();

        let err = store.pending_orders().await.unwrap_err();
        assert!(matches!(err, ShopStoreError::AmountOutOfRange(_)));
        assert!(err.to_string().contains("total of order 1"));

        let err = store.top_three_customers().await.unwrap_err();
        assert!(matches!(err, ShopStoreError::AmountOutOfRange(_)));

        // Queries without money arithmetic still answer
        assert_eq!(store.orders_with_item_counts().await.unwrap()[0].item_count, 3);
    }

    #[tokio::test]
    async fn products_sorted_by_price_descending() {
        let rows = sample_store().products_by_price_desc().await.unwrap();

        for pair in rows.windows(2) {
            assert!(pair[0].price >= pair[1].price);
        }
        let names: Vec<_> = rows.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Laptop",
                "Smartwatch",
                "Headphones",
                "Coffee Maker",
                "Novel",
                "Phone Case"
            ]
        );
    }

    #[tokio::test]
    async fn pending_orders_match_status_exactly() {
        let rows = sample_store().pending_orders().await.unwrap();

        assert_eq!(order_ids(&rows, |r| r.order_id), vec![101, 104]);
        assert_eq!(rows[0].total, Money::from_dollars(1400));
        assert_eq!(rows[1].total, Money::from_dollars(90));
        assert_eq!(rows[1].order_date, reference() - Duration::days(10));
    }

    #[tokio::test]
    async fn lowercase_status_selects_only_lowercase_order() {
        let rows = sample_store()
            .orders_with_status_totals("pending")
            .await
            .unwrap();

        assert_eq!(order_ids(&rows, |r| r.order_id), vec![103]);
        assert_eq!(rows[0].total, Money::from_dollars(75));
    }

    #[tokio::test]
    async fn order_counts_exclude_customers_without_orders() {
        let store = sample_store();
        let rows = store.order_counts_per_customer().await.unwrap();

        let total: i64 = rows.iter().map(|r| r.order_count).sum();
        assert_eq!(total, store.snapshot().await.orders.len() as i64);
        assert!(rows.iter().all(|r| r.customer_name != "Dave Brown"));
        let counts: Vec<_> = rows
            .iter()
            .map(|r| (r.customer_name.as_str(), r.order_count))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("Alice Smith", 2),
                ("Bob Jones", 2),
                ("Carol White", 1),
                ("Erin Green", 1)
            ]
        );
    }

    #[tokio::test]
    async fn top_three_customers_by_value() {
        let rows = sample_store().top_three_customers().await.unwrap();

        let values: Vec<_> = rows
            .iter()
            .map(|r| (r.customer_name.as_str(), r.total_value))
            .collect();
        assert_eq!(
            values,
            vec![
                ("Alice Smith", Money::from_dollars(1445)),
                ("Carol White", Money::from_dollars(300)),
                ("Erin Green", Money::from_dollars(250)),
            ]
        );
    }

    #[tokio::test]
    async fn customer_without_orders_ranks_last_with_zero() {
        let rows = sample_store().top_customers_by_value(10).await.unwrap();

        assert_eq!(rows.len(), 5);
        for pair in rows.windows(2) {
            assert!(pair[0].total_value >= pair[1].total_value);
        }
        let last = rows.last().unwrap();
        assert_eq!(last.customer_name, "Dave Brown");
        assert!(last.total_value.is_zero());
    }

    #[tokio::test]
    async fn top_customers_limit_exceeding_customers() {
        let dataset = Dataset::new()
            .customer(Customer::new(1, "Ann", "Lee", "ann@example.com"))
            .customer(Customer::new(2, "Ben", "Ray", "ben@example.com"));
        let store = InMemoryShopStore::from_dataset(dataset).unwrap();

        let rows = store.top_three_customers().await.unwrap();
        assert_eq!(rows.len(), 2);
        // equal totals fall back to id order
        assert_eq!(rows[0].customer_name, "Ann Lee");
    }

    #[tokio::test]
    async fn recent_orders_window_is_inclusive() {
        let rows = sample_store().recent_orders(reference()).await.unwrap();

        // 102 is exactly 30 days old, 103 is 31 days old
        assert_eq!(order_ids(&rows, |r| r.order_id), vec![101, 102, 104]);
        assert_eq!(rows[1].order_date, reference() - Duration::days(30));
        assert_eq!(rows[1].customer_name, "Alice Smith");
    }

    #[tokio::test]
    async fn recent_orders_follow_injected_now() {
        let later = reference() + Duration::days(20);
        let rows = sample_store().recent_orders(later).await.unwrap();

        assert_eq!(order_ids(&rows, |r| r.order_id), vec![101, 104]);
    }

    #[tokio::test]
    async fn units_sold_aggregate_across_orders() {
        let rows = sample_store().units_sold_per_product().await.unwrap();

        let sold: Vec<_> = rows
            .iter()
            .map(|r| (r.product_name.as_str(), r.total_sold))
            .collect();
        assert_eq!(
            sold,
            vec![
                ("Novel", 5),
                ("Phone Case", 4),
                ("Headphones", 3),
                ("Coffee Maker", 3),
                ("Laptop", 1),
                ("Smartwatch", 1),
            ]
        );
    }

    #[tokio::test]
    async fn discounted_orders_list_only_discounted_items() {
        let rows = sample_store().discounted_orders().await.unwrap();

        assert_eq!(order_ids(&rows, |r| r.order_id), vec![101, 103, 105]);
        assert_eq!(rows[0].customer_name, "Alice Smith");
        assert_eq!(
            rows[0].items,
            vec![DiscountedItem {
                product_id: ProductId::new(1),
                product_name: "Laptop".to_string(),
                discount: Money::from_dollars(100),
            }]
        );
        assert_eq!(rows[2].items[0].product_name, "Headphones");
        assert_eq!(rows[2].items.len(), 1);
    }

    #[tokio::test]
    async fn electronics_orders_with_top_stock() {
        let rows = sample_store().electronics_orders().await.unwrap();

        assert_eq!(order_ids(&rows, |r| r.order_id), vec![101, 105, 106]);

        let first = &rows[0];
        assert_eq!(first.customer_name, "Alice Smith");
        assert_eq!(first.products.len(), 2);
        assert_eq!(
            first.products[0].top_store,
            Some(StoreStock {
                store_id: StoreId::new(2),
                store_name: "Airport".to_string(),
                quantity: 12,
            })
        );
    }

    #[tokio::test]
    async fn product_in_two_categories_is_included() {
        let rows = sample_store().electronics_orders().await.unwrap();

        // Headphones are tagged Electronics and Home; Coffee Maker only Home
        let carol = &rows[1];
        assert_eq!(carol.products.len(), 1);
        assert_eq!(carol.products[0].product_name, "Headphones");
    }

    #[tokio::test]
    async fn stock_tie_goes_to_lowest_store_id() {
        let rows = sample_store().electronics_orders().await.unwrap();

        let headphones = &rows[0].products[1];
        assert_eq!(headphones.product_name, "Headphones");
        let top = headphones.top_store.as_ref().unwrap();
        assert_eq!(top.store_name, "Downtown");
        assert_eq!(top.quantity, 20);
    }

    #[tokio::test]
    async fn unstocked_product_has_no_top_store() {
        let rows = sample_store().electronics_orders().await.unwrap();

        let smartwatch = &rows[2].products[0];
        assert_eq!(smartwatch.product_name, "Smartwatch");
        assert!(smartwatch.top_store.is_none());
    }

    #[tokio::test]
    async fn unknown_category_yields_no_orders() {
        let rows = sample_store()
            .category_orders_with_top_stock("electronics")
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn empty_store_yields_empty_reports() {
        let store = InMemoryShopStore::new();

        assert!(store.list_customers().await.unwrap().is_empty());
        assert!(store.top_three_customers().await.unwrap().is_empty());
        assert!(store.units_sold_per_product().await.unwrap().is_empty());
        assert!(store.electronics_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_rejects_invalid_dataset() {
        let store = sample_store();
        let invalid = Dataset::new().order_item(OrderItem::new(
            1,
            1,
            1,
            Money::from_dollars(1),
            1,
            Money::zero(),
        ));

        assert!(store.replace(invalid).await.is_err());
        assert_eq!(store.list_customers().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn queries_are_idempotent() {
        let store = sample_store();
        let first = store.category_orders_with_top_stock("Electronics").await.unwrap();
        let second = store.category_orders_with_top_stock("Electronics").await.unwrap();
        assert_eq!(first, second);
    }
}
