// core/src/pipeline.rs

//! `Pipeline<TData, Err>`: named steps, their handlers, and the run loop.

use crate::context::ContextData;
use crate::control::{PipelineControl, PipelineResult};
use crate::error::{FlowError, FlowResult};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, error, info, info_span, instrument, trace, Instrument};

/// A boxed async step handler.
///
/// Handlers get their own clone of the context. Lock guards must be released
/// before awaiting, otherwise the returned future is not `Send`.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;

struct Step<TData: Send + Sync + 'static, Err> {
  name: String,
  optional: bool,
  handlers: Vec<Handler<TData, Err>>,
}

/// An ordered sequence of named steps over a root context `TData`.
///
/// `Err` is the error type handlers return; it must absorb [`FlowError`] so
/// configuration problems found at run time surface through the same channel.
pub struct Pipeline<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  name: String,
  steps: Vec<Step<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Declares the steps in execution order as `(name, optional)` pairs.
  /// An optional step without handlers is skipped; a required one fails the run.
  pub fn new(name: impl Into<String>, step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(step_name, optional)| Step {
        name: (*step_name).to_string(),
        optional: *optional,
        handlers: Vec::new(),
      })
      .collect();

    Self {
      name: name.into(),
      steps,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> impl Iterator<Item = &str> {
    self.steps.iter().map(|s| s.name.as_str())
  }

  /// Attaches a handler to `step_name`. Handlers of one step run in the order
  /// they were attached.
  pub fn on<F>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<PipelineControl, Err>> + Send + 'static,
  {
    let pipeline = self.name.clone();
    let step = self
      .steps
      .iter_mut()
      .find(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        pipeline,
        step_name: step_name.to_string(),
      })?;

    let handler: Handler<TData, Err> = Box::new(move |ctx_data| Box::pin(handler_fn(ctx_data)));
    step.handlers.push(handler);
    Ok(self)
  }

  /// Runs every step in order against `ctx_data`.
  ///
  /// The first handler error aborts the run and is returned unchanged.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(pipeline = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    debug!("Pipeline execution starting.");

    for (step_index, step) in self.steps.iter().enumerate() {
      if step.handlers.is_empty() {
        if step.optional {
          debug!(step = %step.name, "Optional step has no handlers, skipping.");
          continue;
        }
        error!(step = %step.name, "Required step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          pipeline: self.name.clone(),
          step_name: step.name.clone(),
        }));
      }

      let step_span = info_span!("pipeline_step", step = %step.name, step_index);
      for handler_fn in &step.handlers {
        trace!(step = %step.name, "Executing handler.");
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            info!(step = %step.name, "Pipeline stopped by handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            debug!(step = %step.name, error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }

    debug!("Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
