// storefront/src/services/cart.rs

use crate::errors::{AppError, Result};
use crate::models::CartView;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::pipelines::resolve_cart_view;
use crate::services::{retry_on_conflict, run_pipeline};
use crate::state::AppState;
use storefront_flow::ContextData;
use tracing::instrument;
use uuid::Uuid;

/// Adds `quantity` of `product_id` to the user's cart and returns the
/// resulting view. A lost race against another write to the same cart re-runs
/// the whole pipeline on fresh data.
#[instrument(name = "service::add_to_cart", skip(state), err(Display))]
pub async fn add_to_cart(state: &AppState, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<CartView> {
  retry_on_conflict("add_to_cart", state.config.max_write_retries, || async move {
    let ctx_data = ContextData::new(AddToCartCtxData::new(state.clone(), user_id, product_id, quantity));
    run_pipeline(state, ctx_data.clone()).await?;
    ctx_data
      .take(|c| &mut c.cart_view)
      .ok_or_else(|| AppError::Internal("Add-to-cart pipeline produced no cart view.".to_string()))
  })
  .await
}

#[instrument(name = "service::get_cart", skip(state), err(Display))]
pub async fn get_cart(state: &AppState, user_id: Uuid) -> Result<CartView> {
  match state.store.find_cart(user_id).await? {
    Some(cart) => resolve_cart_view(state.store.as_ref(), &cart).await,
    None => Ok(CartView::empty()),
  }
}
