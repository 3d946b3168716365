// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub price_cents: i64,
  pub stock_quantity: i32,
  pub image_url: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn new(name: impl Into<String>, price_cents: i64, stock_quantity: i32) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      description: None,
      price_cents,
      stock_quantity,
      image_url: None,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
    self.image_url = Some(image_url.into());
    self
  }

  pub fn has_stock_for(&self, quantity: i32) -> bool {
    self.stock_quantity >= quantity
  }
}

/// The product fields shown next to a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
  pub id: Uuid,
  pub name: String,
  pub price_cents: i64,
  pub image_url: Option<String>,
}

impl From<&Product> for ProductSummary {
  fn from(product: &Product) -> Self {
    Self {
      id: product.id,
      name: product.name.clone(),
      price_cents: product.price_cents,
      image_url: product.image_url.clone(),
    }
  }
}
