// storefront/src/models/cart.rs

use crate::models::product::{Product, ProductSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CartItem {
  pub product_id: Uuid,
  pub quantity: i32,
}

/// One cart per user. `items` never holds two lines for the same product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
  pub user_id: Uuid,
  pub items: Vec<CartItem>,
  /// Bumped on every successful write; 0 means the cart has never been stored.
  pub version: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn empty(user_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      user_id,
      items: Vec::new(),
      version: 0,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn quantity_of(&self, product_id: Uuid) -> i32 {
    self
      .items
      .iter()
      .find(|item| item.product_id == product_id)
      .map_or(0, |item| item.quantity)
  }

  /// Sets the line for `product_id` to `quantity`, appending a line if the
  /// product is not in the cart yet.
  pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) {
    match self.items.iter_mut().find(|item| item.product_id == product_id) {
      Some(item) => item.quantity = quantity,
      None => self.items.push(CartItem { product_id, quantity }),
    }
  }

  pub fn product_ids(&self) -> Vec<Uuid> {
    self.items.iter().map(|item| item.product_id).collect()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
  pub product_id: Uuid,
  /// `None` when the product has been removed from the catalog since it was added.
  pub product: Option<ProductSummary>,
  pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_id: Option<Uuid>,
  pub items: Vec<CartLineView>,
  /// Sum of quantity times the current price of every resolvable line.
  pub subtotal_cents: i64,
}

impl CartView {
  /// What a user without a cart sees.
  pub fn empty() -> Self {
    Self {
      user_id: None,
      items: Vec::new(),
      subtotal_cents: 0,
    }
  }

  pub fn resolve(cart: &Cart, products: &[Product]) -> Self {
    let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut subtotal_cents: i64 = 0;
    let items = cart
      .items
      .iter()
      .map(|item| {
        let product = by_id.get(&item.product_id).copied();
        if let Some(product) = product {
          subtotal_cents = subtotal_cents.saturating_add(product.price_cents.saturating_mul(i64::from(item.quantity)));
        }
        CartLineView {
          product_id: item.product_id,
          product: product.map(ProductSummary::from),
          quantity: item.quantity,
        }
      })
      .collect();

    Self {
      user_id: Some(cart.user_id),
      items,
      subtotal_cents,
    }
  }

  pub fn quantity_of(&self, product_id: Uuid) -> i32 {
    self
      .items
      .iter()
      .find(|line| line.product_id == product_id)
      .map_or(0, |line| line.quantity)
  }
}
