// storefront/src/pipelines/checkout_pipeline.rs

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderItem, Product};
use crate::pipelines::contexts::PlaceOrderCtxData;
use std::collections::HashMap;
use storefront_flow::{ContextData, FlowResult, Pipeline, PipelineControl, Workflows};
use tracing::{info, warn};
use uuid::Uuid;

pub const PLACE_ORDER_STEPS: &[(&str, bool)] = &[
  ("load_cart_for_checkout", false),
  ("validate_and_price_items", false),
  ("commit_order", false),
];

pub fn register_place_order_pipeline(workflows: &Workflows<AppError>) -> FlowResult<()> {
  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new("place_order", PLACE_ORDER_STEPS);

  p.on("load_cart_for_checkout", load_cart_for_checkout)?
    .on("validate_and_price_items", validate_and_price_items)?
    .on("commit_order", commit_order)?;

  workflows.register(p);
  info!("Place Order pipeline registered.");
  Ok(())
}

async fn load_cart_for_checkout(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl> {
  let (store, user_id) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.user_id)
  };

  let cart = match store.find_cart(user_id).await? {
    Some(cart) if !cart.is_empty() => cart,
    _ => {
      warn!(%user_id, "Checkout Pipeline: No items in cart.");
      return Err(AppError::EmptyCart);
    }
  };

  info!(%user_id, lines = cart.items.len(), version = cart.version, "Checkout Pipeline: Cart loaded.");
  ctx_data.write().cart = Some(cart);
  Ok(PipelineControl::Continue)
}

/// Checks every line against current stock and captures current prices.
/// Nothing is written here.
async fn validate_and_price_items(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl> {
  let (store, cart) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.cart.clone())
  };
  let cart = cart.ok_or_else(|| AppError::Internal("Cart missing from checkout context.".to_string()))?;

  let products: HashMap<Uuid, Product> = store
    .find_products(&cart.product_ids())
    .await?
    .into_iter()
    .map(|p| (p.id, p))
    .collect();

  let mut items = Vec::with_capacity(cart.items.len());
  for line in &cart.items {
    let product = products
      .get(&line.product_id)
      .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", line.product_id)))?;
    if !product.has_stock_for(line.quantity) {
      warn!(
        product_id = %product.id,
        requested = line.quantity,
        available = product.stock_quantity,
        "Checkout Pipeline: Insufficient stock."
      );
      return Err(AppError::InsufficientStock {
        product_name: product.name.clone(),
        requested: line.quantity,
        available: product.stock_quantity,
      });
    }
    items.push(OrderItem {
      product_id: product.id,
      quantity: line.quantity,
      price_cents: product.price_cents,
    });
  }

  let order = Order::pending(cart.user_id, items)?;
  info!(order_id = %order.id, total_price_cents = order.total_price_cents, "Checkout Pipeline: Order priced.");
  ctx_data.write().draft_order = Some(order);
  Ok(PipelineControl::Continue)
}

async fn commit_order(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl> {
  let (store, cart_version) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.cart.as_ref().map(|c| c.version))
  };
  let cart_version =
    cart_version.ok_or_else(|| AppError::Internal("Cart missing from checkout context.".to_string()))?;
  let order = ctx_data
    .take(|c| &mut c.draft_order)
    .ok_or_else(|| AppError::Internal("Draft order missing from checkout context.".to_string()))?;

  store.commit_order(&order, cart_version).await?;

  info!(order_id = %order.id, user_id = %order.user_id, "Checkout Pipeline: Order committed.");
  ctx_data.write().placed_order = Some(order);
  Ok(PipelineControl::Continue)
}
