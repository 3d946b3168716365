// storefront/src/state.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::pipelines::register_all_pipelines;
use crate::store::Store;
use std::sync::Arc;
use storefront_flow::Workflows;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub workflows: Arc<Workflows<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the store and registers every pipeline.
  pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Result<Self> {
    let workflows = Workflows::<AppError>::new();
    register_all_pipelines(&workflows)?;
    Ok(Self {
      store,
      workflows: Arc::new(workflows),
      config: Arc::new(config),
    })
  }
}
