// tests/pipeline_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storefront_flow::{ContextData, Pipeline, PipelineControl, PipelineResult};

fn checkout_like_pipeline() -> Pipeline<TestContext, TestError> {
  Pipeline::new(
    "checkout_like",
    &[("load", false), ("price", false), ("commit", false)],
  )
}

#[tokio::test]
#[serial]
async fn runs_steps_in_declared_order() {
  setup_tracing();
  let mut pipeline = checkout_like_pipeline();
  // Attach out of order; declaration order wins.
  pipeline.on("commit", add_amount_handler("commit", 100)).unwrap();
  pipeline.on("load", add_amount_handler("load", 1)).unwrap();
  pipeline.on("price", add_amount_handler("price", 10)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.total_cents, 111);
  assert_eq!(guard.steps_executed, vec!["load", "price", "commit"]);
}

#[tokio::test]
#[serial]
async fn handlers_of_one_step_run_in_attach_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new("single", &[("price", false)]);
  pipeline
    .on("price", add_amount_handler("first", 1))
    .unwrap()
    .on("price", add_amount_handler("second", 2))
    .unwrap();

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().steps_executed, vec!["first", "second"]);
}

#[tokio::test]
#[serial]
async fn stop_halts_remaining_steps() {
  setup_tracing();
  let mut pipeline = checkout_like_pipeline();
  pipeline.on("load", add_amount_handler("load", 1)).unwrap();
  pipeline.on("price", add_amount_handler("price", 10)).unwrap();
  pipeline.on("commit", add_amount_handler("commit", 100)).unwrap();

  let ctx = ContextData::new(TestContext {
    should_stop_at: Some("price".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  let guard = ctx.read();
  assert_eq!(guard.total_cents, 11);
  assert_eq!(guard.steps_executed, vec!["load", "price"]);
}

#[tokio::test]
#[serial]
async fn handler_error_aborts_run_and_is_returned_unchanged() {
  setup_tracing();
  let mut pipeline = checkout_like_pipeline();
  pipeline.on("load", add_amount_handler("load", 1)).unwrap();
  pipeline.on("price", failing_handler("price", "out of stock")).unwrap();
  pipeline.on("commit", add_amount_handler("commit", 100)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Step("out of stock".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.total_cents, 1);
  assert_eq!(guard.steps_executed, vec!["load", "price"]);
}

#[tokio::test]
#[serial]
async fn required_step_without_handler_fails_before_later_steps() {
  setup_tracing();
  let mut pipeline = checkout_like_pipeline();
  pipeline.on("load", add_amount_handler("load", 1)).unwrap();
  pipeline.on("commit", add_amount_handler("commit", 100)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  let err = pipeline.run(ctx.clone()).await.unwrap_err();

  match err {
    TestError::Flow(s) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("price"));
    }
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
  assert_eq!(ctx.read().steps_executed, vec!["load"]);
}

#[tokio::test]
#[serial]
async fn optional_step_without_handler_is_skipped() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new("with_optional", &[("load", false), ("notify", true)]);
  pipeline.on("load", add_amount_handler("load", 5)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().total_cents, 5);
}

#[tokio::test]
#[serial]
async fn attaching_to_unknown_step_is_rejected() {
  setup_tracing();
  let mut pipeline = checkout_like_pipeline();
  let err = pipeline
    .on("refund", |_ctx: ContextData<TestContext>| async move {
      Ok::<_, TestError>(PipelineControl::Continue)
    })
    .err()
    .expect("unknown step must be rejected");

  assert!(err.to_string().contains("refund"));
  assert_eq!(
    pipeline.step_names().collect::<Vec<_>>(),
    vec!["load", "price", "commit"]
  );
}

#[tokio::test]
#[serial]
async fn handlers_may_await_between_lock_scopes() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new("awaiting", &[("price", false)]);
  pipeline
    .on("price", |ctx: ContextData<TestContext>| async move {
      let base = { ctx.read().total_cents };
      tokio::time::sleep(std::time::Duration::from_millis(5)).await;
      ctx.write().total_cents = base + 42;
      Ok::<_, TestError>(PipelineControl::Continue)
    })
    .unwrap();

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().total_cents, 42);
  assert_eq!(ctx.take(|c| &mut c.should_stop_at), None);
}
