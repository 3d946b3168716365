// storefront/src/models/order.rs

use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

/// Orders are created `Pending`; later transitions belong to fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Paid,
  Shipped,
  Delivered,
  Cancelled,
}

/// A purchased line with the unit price captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_cents: i64,
}

impl OrderItem {
  pub fn line_total_cents(&self) -> Option<i64> {
    self.price_cents.checked_mul(i64::from(self.quantity))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub items: Vec<OrderItem>,
  pub total_price_cents: i64,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// Builds a pending order, totalling `items` at their captured prices.
  pub fn pending(user_id: Uuid, items: Vec<OrderItem>) -> Result<Self> {
    let total_price_cents = items
      .iter()
      .try_fold(0i64, |acc, item| item.line_total_cents().and_then(|line| acc.checked_add(line)))
      .ok_or_else(|| AppError::Validation("Order total is too large.".to_string()))?;

    let now = Utc::now();
    Ok(Self {
      id: Uuid::new_v4(),
      user_id,
      items,
      total_price_cents,
      status: OrderStatus::Pending,
      created_at: now,
      updated_at: now,
    })
  }
}
