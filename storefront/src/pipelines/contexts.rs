// storefront/src/pipelines/contexts.rs

//! Root context data for the storefront pipelines.
//! Handlers receive these wrapped in `storefront_flow::ContextData`.

use crate::models::{Cart, CartView, Order, Product};
use crate::state::AppState;
use uuid::Uuid;

/// Add-to-cart run. Inputs first, then what the steps fill in.
#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub product: Option<Product>,
  /// The merged cart; after `persist_cart` this is the stored version.
  pub cart: Option<Cart>,
  pub cart_view: Option<CartView>,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, user_id: Uuid, product_id: Uuid, quantity: i32) -> Self {
    Self {
      app_state,
      user_id,
      product_id,
      quantity,
      product: None,
      cart: None,
      cart_view: None,
    }
  }
}

/// Checkout run for one user's cart.
#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub cart: Option<Cart>,
  /// Priced but not yet committed.
  pub draft_order: Option<Order>,
  pub placed_order: Option<Order>,
}

impl PlaceOrderCtxData {
  pub fn new(app_state: AppState, user_id: Uuid) -> Self {
    Self {
      app_state,
      user_id,
      cart: None,
      draft_order: None,
      placed_order: None,
    }
  }
}
