// storefront/src/services/orders.rs

use crate::errors::{AppError, Result};
use crate::models::Order;
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::services::{retry_on_conflict, run_pipeline};
use crate::state::AppState;
use storefront_flow::ContextData;
use tracing::{info, instrument};
use uuid::Uuid;

/// Turns the user's cart into a pending order.
///
/// If the cart changes between pricing and commit the checkout starts over,
/// so the order always reflects the cart that was actually removed.
#[instrument(name = "service::place_order", skip(state), err(Display))]
pub async fn place_order(state: &AppState, user_id: Uuid) -> Result<Order> {
  let order = retry_on_conflict("place_order", state.config.max_write_retries, || async move {
    let ctx_data = ContextData::new(PlaceOrderCtxData::new(state.clone(), user_id));
    run_pipeline(state, ctx_data.clone()).await?;
    ctx_data
      .take(|c| &mut c.placed_order)
      .ok_or_else(|| AppError::Internal("Place-order pipeline produced no order.".to_string()))
  })
  .await?;

  info!(order_id = %order.id, total_price_cents = order.total_price_cents, "Order placed.");
  Ok(order)
}

#[instrument(name = "service::list_orders", skip(state), err(Display))]
pub async fn list_orders(state: &AppState, user_id: Uuid) -> Result<Vec<Order>> {
  state.store.list_orders(user_id).await
}

#[instrument(name = "service::get_order", skip(state), err(Display))]
pub async fn get_order(state: &AppState, user_id: Uuid, order_id: Uuid) -> Result<Order> {
  state
    .store
    .find_order(user_id, order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order with ID {} not found.", order_id)))
}
