// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::sync::Arc;
use storefront::config::{AppConfig, StoreBackend};
use storefront::models::Product;
use storefront::state::AppState;
use storefront::store::{MemoryStore, Store};
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

/// Retries above the number of concurrent writers any test spawns, so a
/// conflicting writer always gets through eventually.
pub fn test_config() -> AppConfig {
  AppConfig {
    store_backend: StoreBackend::Memory,
    max_write_retries: 8,
    ..AppConfig::default()
  }
}

pub fn test_app() -> (AppState, Arc<MemoryStore>) {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let state = AppState::new(store.clone(), test_config()).expect("pipelines register");
  (state, store)
}

pub async fn seed_product(store: &MemoryStore, name: &str, price_cents: i64, stock_quantity: i32) -> Product {
  let product = Product::new(name, price_cents, stock_quantity);
  store.upsert_product(&product).await.expect("seed product");
  product
}

pub async fn stock_of(store: &MemoryStore, product_id: Uuid) -> i32 {
  store
    .find_product(product_id)
    .await
    .expect("find product")
    .expect("product exists")
    .stock_quantity
}

pub async fn set_stock(store: &MemoryStore, product_id: Uuid, stock_quantity: i32) {
  let mut product = store.find_product(product_id).await.unwrap().unwrap();
  product.stock_quantity = stock_quantity;
  store.upsert_product(&product).await.unwrap();
}
