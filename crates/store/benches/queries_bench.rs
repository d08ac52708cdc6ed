use chrono::{TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use store::{InMemoryShopStore, ShopStore, ShopStoreExt};

fn sample_store() -> InMemoryShopStore {
    InMemoryShopStore::sample_at(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap())
}

fn bench_top_customers(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = sample_store();

    c.bench_function("store/top_customers_by_value", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.top_three_customers().await.unwrap();
            });
        });
    });
}

fn bench_units_sold(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = sample_store();

    c.bench_function("store/units_sold_per_product", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.units_sold_per_product().await.unwrap();
            });
        });
    });
}

fn bench_category_top_stock(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = sample_store();

    c.bench_function("store/category_orders_with_top_stock", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.electronics_orders().await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_top_customers,
    bench_units_sold,
    bench_category_top_stock
);
criterion_main!(benches);
