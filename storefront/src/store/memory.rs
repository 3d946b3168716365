// storefront/src/store/memory.rs

use crate::errors::{AppError, Result};
use crate::models::{Cart, Order, Product};
use crate::store::Store;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
  products: HashMap<Uuid, Product>,
  carts: HashMap<Uuid, Cart>,
  orders: Vec<Order>,
}

/// A [`Store`] held in process memory.
///
/// Every operation takes the single state lock for its whole duration, which
/// makes `save_cart` and `commit_order` trivially atomic.
#[derive(Default)]
pub struct MemoryStore {
  state: Mutex<MemoryState>,
  fail_order_writes: AtomicBool,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Drops a product from the catalog. Carts referencing it are left alone.
  pub fn remove_product(&self, product_id: Uuid) -> Option<Product> {
    self.state.lock().products.remove(&product_id)
  }

  /// While set, `commit_order` fails at the point the order would be written.
  pub fn fail_order_writes(&self, fail: bool) {
    self.fail_order_writes.store(fail, Ordering::SeqCst);
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn list_products(&self) -> Result<Vec<Product>> {
    let mut products: Vec<Product> = self.state.lock().products.values().cloned().collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
  }

  async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>> {
    Ok(self.state.lock().products.get(&product_id).cloned())
  }

  async fn find_products(&self, product_ids: &[Uuid]) -> Result<Vec<Product>> {
    let state = self.state.lock();
    Ok(product_ids.iter().filter_map(|id| state.products.get(id).cloned()).collect())
  }

  async fn upsert_product(&self, product: &Product) -> Result<()> {
    self.state.lock().products.insert(product.id, product.clone());
    Ok(())
  }

  async fn find_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
    Ok(self.state.lock().carts.get(&user_id).cloned())
  }

  async fn save_cart(&self, cart: &Cart) -> Result<Cart> {
    let mut state = self.state.lock();
    let stored_version = state.carts.get(&cart.user_id).map_or(0, |c| c.version);
    if stored_version != cart.version {
      debug!(user_id = %cart.user_id, expected = cart.version, stored_version, "Cart version mismatch.");
      return Err(AppError::Conflict("Cart was modified concurrently.".to_string()));
    }

    let mut saved = cart.clone();
    saved.version += 1;
    saved.updated_at = Utc::now();
    state.carts.insert(saved.user_id, saved.clone());
    Ok(saved)
  }

  async fn commit_order(&self, order: &Order, cart_version: i64) -> Result<()> {
    let mut state = self.state.lock();

    let stored_version = state.carts.get(&order.user_id).map(|c| c.version);
    if stored_version != Some(cart_version) {
      return Err(AppError::Conflict("Cart changed during checkout.".to_string()));
    }

    // Check every line before touching anything.
    for item in &order.items {
      let product = state
        .products
        .get(&item.product_id)
        .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", item.product_id)))?;
      if product.stock_quantity < item.quantity {
        return Err(AppError::InsufficientStock {
          product_name: product.name.clone(),
          requested: item.quantity,
          available: product.stock_quantity,
        });
      }
    }

    if self.fail_order_writes.load(Ordering::SeqCst) {
      warn!(order_id = %order.id, "Order write rejected by memory store.");
      return Err(AppError::Internal("Failed to persist order.".to_string()));
    }

    let now = Utc::now();
    for item in &order.items {
      if let Some(product) = state.products.get_mut(&item.product_id) {
        product.stock_quantity -= item.quantity;
        product.updated_at = now;
      }
    }
    state.orders.push(order.clone());
    state.carts.remove(&order.user_id);
    Ok(())
  }

  async fn find_order(&self, user_id: Uuid, order_id: Uuid) -> Result<Option<Order>> {
    let state = self.state.lock();
    Ok(
      state
        .orders
        .iter()
        .find(|o| o.id == order_id && o.user_id == user_id)
        .cloned(),
    )
  }

  async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let state = self.state.lock();
    // `orders` is in insertion order.
    Ok(state.orders.iter().rev().filter(|o| o.user_id == user_id).cloned().collect())
  }
}
