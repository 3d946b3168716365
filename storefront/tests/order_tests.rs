// tests/order_tests.rs

mod common;

use common::{seed_product, set_stock, stock_of, test_app};
use storefront::errors::AppError;
use storefront::models::OrderStatus;
use storefront::services;
use storefront::store::Store;
use uuid::Uuid;

#[tokio::test]
async fn placing_an_order_decrements_stock_and_clears_cart() {
  let (state, store) = test_app();
  let mug = seed_product(&store, "Mug", 1_250, 5).await;
  let user = Uuid::new_v4();
  services::add_to_cart(&state, user, mug.id, 3).await.unwrap();

  let order = services::place_order(&state, user).await.unwrap();

  assert_eq!(order.user_id, user);
  assert_eq!(order.status, OrderStatus::Pending);
  assert_eq!(order.items.len(), 1);
  assert_eq!(order.items[0].price_cents, 1_250);
  assert_eq!(order.total_price_cents, 3 * 1_250);
  assert_eq!(stock_of(&store, mug.id).await, 2);
  assert!(store.find_cart(user).await.unwrap().is_none());
  assert!(services::get_cart(&state, user).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn multi_item_order_totals_and_decrements_each_product() {
  let (state, store) = test_app();
  let mug = seed_product(&store, "Mug", 1_000, 10).await;
  let kettle = seed_product(&store, "Kettle", 4_999, 3).await;
  let user = Uuid::new_v4();
  services::add_to_cart(&state, user, mug.id, 4).await.unwrap();
  services::add_to_cart(&state, user, kettle.id, 3).await.unwrap();

  let order = services::place_order(&state, user).await.unwrap();

  assert_eq!(order.total_price_cents, 4 * 1_000 + 3 * 4_999);
  assert_eq!(stock_of(&store, mug.id).await, 6);
  assert_eq!(stock_of(&store, kettle.id).await, 0);
}

#[tokio::test]
async fn empty_cart_cannot_be_ordered() {
  let (state, store) = test_app();
  let mug = seed_product(&store, "Mug", 1_000, 5).await;
  let user = Uuid::new_v4();

  let err = services::place_order(&state, user).await.unwrap_err();

  assert!(matches!(err, AppError::EmptyCart));
  assert_eq!(stock_of(&store, mug.id).await, 5);
  assert!(services::list_orders(&state, user).await.unwrap().is_empty());
}

#[tokio::test]
async fn one_line_over_stock_fails_the_whole_order() {
  let (state, store) = test_app();
  let mug = seed_product(&store, "Mug", 1_000, 10).await;
  let kettle = seed_product(&store, "Kettle", 4_000, 5).await;
  let user = Uuid::new_v4();
  services::add_to_cart(&state, user, mug.id, 2).await.unwrap();
  services::add_to_cart(&state, user, kettle.id, 3).await.unwrap();
  set_stock(&store, kettle.id, 2).await;

  let err = services::place_order(&state, user).await.unwrap_err();

  assert!(matches!(err, AppError::InsufficientStock { requested: 3, available: 2, .. }));
  assert_eq!(stock_of(&store, mug.id).await, 10);
  assert_eq!(stock_of(&store, kettle.id).await, 2);
  assert_eq!(store.find_cart(user).await.unwrap().unwrap().items.len(), 2);
  assert!(services::list_orders(&state, user).await.unwrap().is_empty());
}

#[tokio::test]
async fn product_removed_after_adding_fails_checkout() {
  let (state, store) = test_app();
  let mug = seed_product(&store, "Mug", 1_000, 10).await;
  let user = Uuid::new_v4();
  services::add_to_cart(&state, user, mug.id, 1).await.unwrap();
  store.remove_product(mug.id);

  let err = services::place_order(&state, user).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
  assert!(store.find_cart(user).await.unwrap().is_some());
}

#[tokio::test]
async fn failed_order_write_leaves_stock_and_cart_intact() {
  let (state, store) = test_app();
  let mug = seed_product(&store, "Mug", 1_000, 5).await;
  let user = Uuid::new_v4();
  services::add_to_cart(&state, user, mug.id, 2).await.unwrap();

  store.fail_order_writes(true);
  let err = services::place_order(&state, user).await.unwrap_err();
  assert!(matches!(err, AppError::Internal(_)));
  assert_eq!(stock_of(&store, mug.id).await, 5);
  assert_eq!(store.find_cart(user).await.unwrap().unwrap().quantity_of(mug.id), 2);
  assert!(services::list_orders(&state, user).await.unwrap().is_empty());

  store.fail_order_writes(false);
  services::place_order(&state, user).await.unwrap();
  assert_eq!(stock_of(&store, mug.id).await, 3);
}

#[tokio::test]
async fn later_price_changes_do_not_alter_placed_orders() {
  let (state, store) = test_app();
  let mug = seed_product(&store, "Mug", 1_000, 5).await;
  let user = Uuid::new_v4();
  services::add_to_cart(&state, user, mug.id, 2).await.unwrap();
  let placed = services::place_order(&state, user).await.unwrap();

  let mut repriced = store.find_product(mug.id).await.unwrap().unwrap();
  repriced.price_cents = 9_999;
  store.upsert_product(&repriced).await.unwrap();

  let fetched = services::get_order(&state, user, placed.id).await.unwrap();
  assert_eq!(fetched.items[0].price_cents, 1_000);
  assert_eq!(fetched.total_price_cents, 2_000);
}

#[tokio::test]
async fn orders_are_listed_newest_first_and_scoped_to_their_owner() {
  let (state, store) = test_app();
  let mug = seed_product(&store, "Mug", 1_000, 10).await;
  let user = Uuid::new_v4();
  let other_user = Uuid::new_v4();

  services::add_to_cart(&state, user, mug.id, 1).await.unwrap();
  let first = services::place_order(&state, user).await.unwrap();
  services::add_to_cart(&state, user, mug.id, 2).await.unwrap();
  let second = services::place_order(&state, user).await.unwrap();

  let listed = services::list_orders(&state, user).await.unwrap();
  assert_eq!(listed.iter().map(|o| o.id).collect::<Vec<_>>(), vec![second.id, first.id]);
  assert!(services::list_orders(&state, other_user).await.unwrap().is_empty());

  let err = services::get_order(&state, other_user, first.id).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_for_the_last_unit_never_oversell() {
  let (state, store) = test_app();
  let grinder = seed_product(&store, "Grinder", 12_900, 1).await;
  let users: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
  for user in &users {
    services::add_to_cart(&state, *user, grinder.id, 1).await.unwrap();
  }

  let tasks: Vec<_> = users
    .iter()
    .map(|user| {
      let state = state.clone();
      let user = *user;
      tokio::spawn(async move { services::place_order(&state, user).await })
    })
    .collect();

  let mut placed = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(_) => placed += 1,
      Err(AppError::InsufficientStock { .. }) => {}
      Err(other) => panic!("unexpected error: {:?}", other),
    }
  }

  assert_eq!(placed, 1);
  assert_eq!(stock_of(&store, grinder.id).await, 0);
}
