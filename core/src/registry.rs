// core/src/registry.rs

//! `Workflows<E>`: pipelines keyed by their context type.

use crate::context::ContextData;
use crate::control::PipelineResult;
use crate::error::FlowError;
use crate::pipeline::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

#[async_trait]
trait ErasedPipeline<AppErr>: Send + Sync {
  /// `ctx_obj` must hold a `ContextData<TData>` for the wrapped pipeline.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr>;
}

struct Registered<TData, HandlerErr>
where
  TData: Send + Sync + 'static,
  HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipeline: Pipeline<TData, HandlerErr>,
}

#[async_trait]
impl<TData, HandlerErr, AppErr> ErasedPipeline<AppErr> for Registered<TData, HandlerErr>
where
  TData: Send + Sync + 'static,
  HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<HandlerErr> + From<FlowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr> {
    let ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>();
        error!(expected_type, "Context object type mismatch.");
        return Err(AppErr::from(FlowError::TypeMismatch { expected_type }));
      }
    };
    self.pipeline.run(ctx_data).await.map_err(AppErr::from)
  }
}

/// Registry of pipelines, one per context type.
///
/// `AppErr` is what [`run`](Self::run) returns. Registering a pipeline whose
/// handlers return another error type requires `AppErr: From<ThatError>`.
pub struct Workflows<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipelines: RwLock<HashMap<TypeId, Arc<dyn ErasedPipeline<AppErr>>>>,
}

impl<AppErr> Workflows<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      pipelines: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `pipeline` for contexts of type `TData`, replacing any
  /// pipeline previously registered for that type.
  pub fn register<TData, HandlerErr>(&self, pipeline: Pipeline<TData, HandlerErr>)
  where
    TData: Send + Sync + 'static,
    HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<HandlerErr>,
  {
    debug!(
      pipeline = pipeline.name(),
      context_type = std::any::type_name::<TData>(),
      "Registering pipeline."
    );
    let runner: Arc<dyn ErasedPipeline<AppErr>> = Arc::new(Registered { pipeline });
    self.pipelines.write().insert(TypeId::of::<TData>(), runner);
  }

  pub fn is_registered<TData: Send + Sync + 'static>(&self) -> bool {
    self.pipelines.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the pipeline registered for `TData` against `ctx_data`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, AppErr>
  where
    TData: Send + Sync + 'static,
  {
    let runner = { self.pipelines.read().get(&TypeId::of::<TData>()).cloned() };
    let runner = runner.ok_or_else(|| {
      let context_type = std::any::type_name::<TData>();
      error!(context_type, "No pipeline registered.");
      AppErr::from(FlowError::NotRegistered { context_type })
    })?;

    runner.run_erased(Box::new(ctx_data)).await
  }
}

impl<AppErr> Default for Workflows<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
