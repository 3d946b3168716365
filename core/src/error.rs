// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by the pipeline machinery itself, as opposed to the
/// business errors returned by step handlers.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step not found in pipeline '{pipeline}': {step_name}")]
  StepNotFound { pipeline: String, step_name: String },

  #[error("Handler missing for required step '{step_name}' in pipeline '{pipeline}'")]
  HandlerMissing { pipeline: String, step_name: String },

  #[error("No pipeline registered for context type {context_type}")]
  NotRegistered { context_type: &'static str },

  #[error("Context type mismatch (expected {expected_type})")]
  TypeMismatch { expected_type: &'static str },

  #[error("Step handler failed: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for FlowError {
  fn from(source: AnyhowError) -> Self {
    FlowError::Handler { source }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
