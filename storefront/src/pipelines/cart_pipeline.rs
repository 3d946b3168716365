// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::{AppError, Result};
use crate::models::{Cart, CartView};
use crate::pipelines::contexts::AddToCartCtxData;
use crate::store::Store;
use storefront_flow::{ContextData, FlowResult, Pipeline, PipelineControl, Workflows};
use tracing::{info, warn};

pub const ADD_TO_CART_STEPS: &[(&str, bool)] = &[
  ("validate_cart_input", false),
  ("fetch_product_for_cart", false),
  ("merge_into_cart", false),
  ("persist_cart", false),
  ("resolve_cart_view", false),
];

pub fn register_add_to_cart_pipeline(workflows: &Workflows<AppError>) -> FlowResult<()> {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new("add_to_cart", ADD_TO_CART_STEPS);

  p.on("validate_cart_input", validate_cart_input)?
    .on("fetch_product_for_cart", fetch_product_for_cart)?
    .on("merge_into_cart", merge_into_cart)?
    .on("persist_cart", persist_cart)?
    .on("resolve_cart_view", resolve_cart_view_step)?;

  workflows.register(p);
  info!("Add to Cart pipeline registered.");
  Ok(())
}

/// Resolves product details for every line of `cart` at current prices.
pub async fn resolve_cart_view(store: &dyn Store, cart: &Cart) -> Result<CartView> {
  let products = store.find_products(&cart.product_ids()).await?;
  Ok(CartView::resolve(cart, &products))
}

async fn validate_cart_input(ctx_data: ContextData<AddToCartCtxData>) -> Result<PipelineControl> {
  let quantity = { ctx_data.read().quantity };
  if quantity <= 0 {
    warn!(quantity, "Add to Cart Pipeline: Quantity must be positive.");
    return Err(AppError::Validation("Quantity must be a positive number.".to_string()));
  }
  Ok(PipelineControl::Continue)
}

async fn fetch_product_for_cart(ctx_data: ContextData<AddToCartCtxData>) -> Result<PipelineControl> {
  let (store, product_id) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.product_id)
  };

  let product = store
    .find_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;

  info!(
    %product_id,
    price_cents = product.price_cents,
    stock_quantity = product.stock_quantity,
    "Add to Cart Pipeline: Product found."
  );
  ctx_data.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

async fn merge_into_cart(ctx_data: ContextData<AddToCartCtxData>) -> Result<PipelineControl> {
  let (store, user_id, quantity, product) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.user_id, guard.quantity, guard.product.clone())
  };
  let product = product.ok_or_else(|| AppError::Internal("Product missing from add-to-cart context.".to_string()))?;

  if !product.has_stock_for(quantity) {
    return Err(AppError::InsufficientStock {
      product_name: product.name,
      requested: quantity,
      available: product.stock_quantity,
    });
  }

  let mut cart = store.find_cart(user_id).await?.unwrap_or_else(|| Cart::empty(user_id));
  let new_quantity = cart
    .quantity_of(product.id)
    .checked_add(quantity)
    .ok_or_else(|| AppError::Validation("Quantity is too large.".to_string()))?;

  if !product.has_stock_for(new_quantity) {
    warn!(
      product_id = %product.id,
      new_quantity,
      available = product.stock_quantity,
      "Add to Cart Pipeline: Cumulative quantity exceeds stock."
    );
    return Err(AppError::InsufficientStock {
      product_name: product.name,
      requested: new_quantity,
      available: product.stock_quantity,
    });
  }

  cart.set_quantity(product.id, new_quantity);
  ctx_data.write().cart = Some(cart);
  Ok(PipelineControl::Continue)
}

async fn persist_cart(ctx_data: ContextData<AddToCartCtxData>) -> Result<PipelineControl> {
  let store = { ctx_data.read().app_state.store.clone() };
  let cart = ctx_data
    .take(|c| &mut c.cart)
    .ok_or_else(|| AppError::Internal("Cart missing from add-to-cart context.".to_string()))?;

  let saved = store.save_cart(&cart).await?;
  info!(user_id = %saved.user_id, version = saved.version, lines = saved.items.len(), "Add to Cart Pipeline: Cart saved.");
  ctx_data.write().cart = Some(saved);
  Ok(PipelineControl::Continue)
}

async fn resolve_cart_view_step(ctx_data: ContextData<AddToCartCtxData>) -> Result<PipelineControl> {
  let (store, cart) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.cart.clone())
  };
  let cart = cart.ok_or_else(|| AppError::Internal("Cart missing from add-to-cart context.".to_string()))?;

  let view = resolve_cart_view(store.as_ref(), &cart).await?;
  ctx_data.write().cart_view = Some(view);
  Ok(PipelineControl::Continue)
}
