// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::future::Future;
use std::pin::Pin;
use storefront_flow::{ContextData, FlowError, PipelineControl};
use tracing::Level;

/// Checkout-shaped context: each step appends its name and adds to a running total.
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub total_cents: i64,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow error: {0}")]
  Flow(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}

pub type TestFuture = Pin<Box<dyn Future<Output = Result<PipelineControl, TestError>> + Send>>;

pub fn add_amount_handler(
  step_name: &'static str,
  amount_cents: i64,
) -> impl Fn(ContextData<TestContext>) -> TestFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> TestFuture {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total_cents += amount_cents;
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(step = step_name, total = guard.total_cents, "test handler executed");
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  }
}

pub fn failing_handler(
  step_name: &'static str,
  message: &'static str,
) -> impl Fn(ContextData<TestContext>) -> TestFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> TestFuture {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Step(message.to_string()))
    })
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
