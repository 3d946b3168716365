// storefront/src/store/mod.rs

//! Persistence boundary for the catalog, carts and orders.
//!
//! Two backends implement [`Store`]: [`PgStore`] over a sqlx Postgres pool and
//! [`MemoryStore`] for tests and `STORE_BACKEND=memory`. Both give the same
//! guarantees for the two write paths that race:
//!
//! * [`Store::save_cart`] is a compare-and-swap on `Cart::version`.
//! * [`Store::commit_order`] is all-or-nothing and never drives stock below zero.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::errors::Result;
use crate::models::{Cart, Order, Product};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait Store: Send + Sync + 'static {
  /// All products ordered by name.
  async fn list_products(&self) -> Result<Vec<Product>>;

  async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>>;

  /// Products for the given ids. Unknown ids are absent from the result.
  async fn find_products(&self, product_ids: &[Uuid]) -> Result<Vec<Product>>;

  /// Inserts the product or overwrites the one with the same id.
  async fn upsert_product(&self, product: &Product) -> Result<()>;

  async fn find_cart(&self, user_id: Uuid) -> Result<Option<Cart>>;

  /// Stores `cart` if the stored version still equals `cart.version`
  /// (version 0: only if the user has no cart yet) and returns the stored
  /// cart with its bumped version. A mismatch yields `AppError::Conflict`.
  async fn save_cart(&self, cart: &Cart) -> Result<Cart>;

  /// Atomically persists `order`, decrements stock for each of its items and
  /// deletes the user's cart.
  ///
  /// Fails with `Conflict` if the cart no longer has `cart_version`, and with
  /// `InsufficientStock` or `NotFound` if a product cannot cover its line.
  /// On any error nothing is written.
  async fn commit_order(&self, order: &Order, cart_version: i64) -> Result<()>;

  /// The order, if it exists and belongs to `user_id`.
  async fn find_order(&self, user_id: Uuid, order_id: Uuid) -> Result<Option<Order>>;

  /// The user's orders, newest first.
  async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>>;
}
