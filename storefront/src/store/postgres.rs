// storefront/src/store/postgres.rs

use crate::errors::{AppError, Result};
use crate::models::{Cart, CartItem, Order, OrderItem, OrderStatus, Product};
use crate::store::Store;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, stock_quantity, image_url, created_at, updated_at";

#[derive(FromRow)]
struct CartLineRow {
  version: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  product_id: Option<Uuid>,
  quantity: Option<i32>,
}

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  total_price_cents: i64,
  status: OrderStatus,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct OrderItemRow {
  order_id: Uuid,
  product_id: Uuid,
  quantity: i32,
  price_cents: i64,
}

/// [`Store`] backed by Postgres. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Applies the embedded migrations under `storefront/migrations`.
  pub async fn migrate(&self) -> Result<()> {
    sqlx::migrate!("./migrations")
      .run(&self.pool)
      .await
      .map_err(sqlx::Error::from)?;
    info!("Database migrations applied.");
    Ok(())
  }

  async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>> {
    if rows.is_empty() {
      return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let item_rows = sqlx::query_as::<_, OrderItemRow>(
      "SELECT order_id, product_id, quantity, price_cents FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position",
    )
    .bind(&order_ids)
    .fetch_all(&self.pool)
    .await?;

    let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for row in item_rows {
      items_by_order.entry(row.order_id).or_default().push(OrderItem {
        product_id: row.product_id,
        quantity: row.quantity,
        price_cents: row.price_cents,
      });
    }

    Ok(
      rows
        .into_iter()
        .map(|row| Order {
          items: items_by_order.remove(&row.id).unwrap_or_default(),
          id: row.id,
          user_id: row.user_id,
          total_price_cents: row.total_price_cents,
          status: row.status,
          created_at: row.created_at,
          updated_at: row.updated_at,
        })
        .collect(),
    )
  }
}

#[async_trait]
impl Store for PgStore {
  async fn list_products(&self) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products ORDER BY name", PRODUCT_COLUMNS))
      .fetch_all(&self.pool)
      .await?;
    Ok(products)
  }

  async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  async fn find_products(&self, product_ids: &[Uuid]) -> Result<Vec<Product>> {
    if product_ids.is_empty() {
      return Ok(Vec::new());
    }
    let products = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS))
      .bind(product_ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(products)
  }

  async fn upsert_product(&self, product: &Product) -> Result<()> {
    sqlx::query(
      r#"
      INSERT INTO products (id, name, description, price_cents, stock_quantity, image_url, created_at, updated_at)
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
      ON CONFLICT (id) DO UPDATE SET
        name = EXCLUDED.name,
        description = EXCLUDED.description,
        price_cents = EXCLUDED.price_cents,
        stock_quantity = EXCLUDED.stock_quantity,
        image_url = EXCLUDED.image_url,
        updated_at = EXCLUDED.updated_at
      "#,
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price_cents)
    .bind(product.stock_quantity)
    .bind(&product.image_url)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn find_cart(&self, user_id: Uuid) -> Result<Option<Cart>> {
    // One statement, so header and lines come from the same snapshot.
    let rows = sqlx::query_as::<_, CartLineRow>(
      r#"
      SELECT c.version, c.created_at, c.updated_at, ci.product_id, ci.quantity
      FROM carts c
      LEFT JOIN cart_items ci ON ci.user_id = c.user_id
      WHERE c.user_id = $1
      ORDER BY ci.position
      "#,
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;

    let Some(first) = rows.first() else {
      return Ok(None);
    };
    let mut cart = Cart {
      user_id,
      items: Vec::with_capacity(rows.len()),
      version: first.version,
      created_at: first.created_at,
      updated_at: first.updated_at,
    };
    for row in rows {
      if let (Some(product_id), Some(quantity)) = (row.product_id, row.quantity) {
        cart.items.push(CartItem { product_id, quantity });
      }
    }
    Ok(Some(cart))
  }

  #[instrument(name = "PgStore::save_cart", skip_all, fields(user_id = %cart.user_id, version = cart.version))]
  async fn save_cart(&self, cart: &Cart) -> Result<Cart> {
    let now = Utc::now();
    let mut tx = self.pool.begin().await?;

    let claimed = if cart.version == 0 {
      sqlx::query(
        "INSERT INTO carts (user_id, version, created_at, updated_at) VALUES ($1, 1, $2, $2) ON CONFLICT (user_id) DO NOTHING",
      )
      .bind(cart.user_id)
      .bind(now)
      .execute(&mut *tx)
      .await?
    } else {
      sqlx::query("UPDATE carts SET version = version + 1, updated_at = $2 WHERE user_id = $1 AND version = $3")
        .bind(cart.user_id)
        .bind(now)
        .bind(cart.version)
        .execute(&mut *tx)
        .await?
    };
    if claimed.rows_affected() != 1 {
      debug!("Cart version check failed, rolling back.");
      return Err(AppError::Conflict("Cart was modified concurrently.".to_string()));
    }

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
      .bind(cart.user_id)
      .execute(&mut *tx)
      .await?;
    for (position, item) in cart.items.iter().enumerate() {
      sqlx::query("INSERT INTO cart_items (user_id, product_id, quantity, position) VALUES ($1, $2, $3, $4)")
        .bind(cart.user_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(position as i32)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let mut saved = cart.clone();
    saved.version += 1;
    saved.updated_at = now;
    if cart.version == 0 {
      saved.created_at = now;
    }
    Ok(saved)
  }

  #[instrument(name = "PgStore::commit_order", skip_all, fields(order_id = %order.id, user_id = %order.user_id))]
  async fn commit_order(&self, order: &Order, cart_version: i64) -> Result<()> {
    let mut tx = self.pool.begin().await?;

    let locked_version: Option<i64> = sqlx::query_scalar("SELECT version FROM carts WHERE user_id = $1 FOR UPDATE")
      .bind(order.user_id)
      .fetch_optional(&mut *tx)
      .await?;
    if locked_version != Some(cart_version) {
      debug!(?locked_version, cart_version, "Cart changed since it was priced.");
      return Err(AppError::Conflict("Cart changed during checkout.".to_string()));
    }

    sqlx::query(
      "INSERT INTO orders (id, user_id, total_price_cents, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.total_price_cents)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await?;

    for (position, item) in order.items.iter().enumerate() {
      sqlx::query(
        "INSERT INTO order_items (order_id, product_id, quantity, price_cents, position) VALUES ($1, $2, $3, $4, $5)",
      )
      .bind(order.id)
      .bind(item.product_id)
      .bind(item.quantity)
      .bind(item.price_cents)
      .bind(position as i32)
      .execute(&mut *tx)
      .await?;
    }

    // Fixed lock order across concurrent checkouts.
    let mut by_product: Vec<&OrderItem> = order.items.iter().collect();
    by_product.sort_by_key(|item| item.product_id);

    for item in by_product {
      let decremented = sqlx::query(
        "UPDATE products SET stock_quantity = stock_quantity - $1, updated_at = NOW() WHERE id = $2 AND stock_quantity >= $1",
      )
      .bind(item.quantity)
      .bind(item.product_id)
      .execute(&mut *tx)
      .await?;

      if decremented.rows_affected() != 1 {
        let current: Option<(String, i32)> = sqlx::query_as("SELECT name, stock_quantity FROM products WHERE id = $1")
          .bind(item.product_id)
          .fetch_optional(&mut *tx)
          .await?;
        warn!(product_id = %item.product_id, requested = item.quantity, "Stock decrement refused, rolling back order.");
        return Err(match current {
          Some((product_name, available)) => AppError::InsufficientStock {
            product_name,
            requested: item.quantity,
            available,
          },
          None => AppError::NotFound(format!("Product with ID {} not found.", item.product_id)),
        });
      }
    }

    sqlx::query("DELETE FROM carts WHERE user_id = $1")
      .bind(order.user_id)
      .execute(&mut *tx)
      .await?;

    tx.commit().await?;
    Ok(())
  }

  async fn find_order(&self, user_id: Uuid, order_id: Uuid) -> Result<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(
      "SELECT id, user_id, total_price_cents, status, created_at, updated_at FROM orders WHERE id = $1 AND user_id = $2",
    )
    .bind(order_id)
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;

    match row {
      Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(
      "SELECT id, user_id, total_price_cents, status, created_at, updated_at FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    self.attach_items(rows).await
  }
}
