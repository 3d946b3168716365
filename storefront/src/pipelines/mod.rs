// storefront/src/pipelines/mod.rs

//! Registers the storefront pipelines.

use crate::errors::AppError;
use storefront_flow::{FlowResult, Workflows};

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod contexts;

pub use cart_pipeline::resolve_cart_view;

/// Called once at startup, before the server accepts requests.
pub fn register_all_pipelines(workflows: &Workflows<AppError>) -> FlowResult<()> {
  tracing::info!("Registering storefront pipelines...");

  cart_pipeline::register_add_to_cart_pipeline(workflows)?;
  checkout_pipeline::register_place_order_pipeline(workflows)?;

  tracing::info!("All storefront pipelines registered.");
  Ok(())
}
