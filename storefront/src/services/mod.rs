// storefront/src/services/mod.rs

//! Cart and order operations. Handlers call these; these run the pipelines.

pub mod cart;
pub mod orders;

pub use cart::{add_to_cart, get_cart};
pub use orders::{get_order, list_orders, place_order};

use crate::errors::{AppError, Result};
use crate::state::AppState;
use std::future::Future;
use storefront_flow::{ContextData, PipelineResult};
use tracing::debug;

/// Runs the pipeline registered for `TData`. A handler stopping the run early
/// is treated as an error since every storefront pipeline must complete.
pub(crate) async fn run_pipeline<TData>(state: &AppState, ctx_data: ContextData<TData>) -> Result<()>
where
  TData: Send + Sync + 'static,
{
  match state.workflows.run(ctx_data).await? {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

/// Re-runs `attempt` after a `Conflict`, at most `max_retries` extra times.
/// The last conflict is returned as is.
pub(crate) async fn retry_on_conflict<T, F, Fut>(operation: &'static str, max_retries: u32, mut attempt: F) -> Result<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T>>,
{
  let mut retries = 0;
  loop {
    match attempt().await {
      Err(AppError::Conflict(reason)) if retries < max_retries => {
        retries += 1;
        debug!(operation, retries, %reason, "Write conflict, retrying.");
      }
      outcome => return outcome,
    }
  }
}
