// tests/store_tests.rs

mod common;

use common::seed_product;
use storefront::errors::AppError;
use storefront::models::{Cart, Order, OrderItem};
use storefront::store::{MemoryStore, Store};
use uuid::Uuid;

#[tokio::test]
async fn save_cart_is_compare_and_swap() {
  let store = MemoryStore::new();
  let user = Uuid::new_v4();
  let mut cart = Cart::empty(user);
  cart.set_quantity(Uuid::new_v4(), 1);

  let saved = store.save_cart(&cart).await.unwrap();
  assert_eq!(saved.version, 1);

  // A second "first write" loses.
  let err = store.save_cart(&cart).await.unwrap_err();
  assert!(matches!(err, AppError::Conflict(_)));

  let saved_again = store.save_cart(&saved).await.unwrap();
  assert_eq!(saved_again.version, 2);

  // Writing from the stale copy loses too.
  assert!(matches!(store.save_cart(&saved).await, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn commit_order_with_stale_cart_writes_nothing() {
  let store = MemoryStore::new();
  let mug = seed_product(&store, "Mug", 1_000, 5).await;
  let user = Uuid::new_v4();
  let mut cart = Cart::empty(user);
  cart.set_quantity(mug.id, 2);
  let saved = store.save_cart(&cart).await.unwrap();

  let order = Order::pending(
    user,
    vec![OrderItem {
      product_id: mug.id,
      quantity: 2,
      price_cents: 1_000,
    }],
  )
  .unwrap();

  let err = store.commit_order(&order, saved.version + 1).await.unwrap_err();
  assert!(matches!(err, AppError::Conflict(_)));
  assert_eq!(store.find_product(mug.id).await.unwrap().unwrap().stock_quantity, 5);
  assert!(store.find_order(user, order.id).await.unwrap().is_none());

  store.commit_order(&order, saved.version).await.unwrap();
  assert_eq!(store.find_product(mug.id).await.unwrap().unwrap().stock_quantity, 3);
  assert!(store.find_cart(user).await.unwrap().is_none());
  assert_eq!(store.find_order(user, order.id).await.unwrap(), Some(order));
}

#[tokio::test]
async fn find_products_skips_unknown_ids() {
  let store = MemoryStore::new();
  let mug = seed_product(&store, "Mug", 1_000, 5).await;

  let found = store.find_products(&[mug.id, Uuid::new_v4()]).await.unwrap();
  assert_eq!(found, vec![mug]);
}
