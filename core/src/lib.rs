// core/src/lib.rs

//! Step-pipeline core for the storefront workflows.
//!
//! A [`Pipeline`] is an ordered list of named steps. Each step owns one or more
//! async handlers that receive a clone of the shared [`ContextData`] and answer
//! with a [`PipelineControl`]. Pipelines are registered in a [`Workflows`]
//! registry keyed by their context type, so callers only need to build the
//! context and call [`Workflows::run`].
//!
//! ```ignore
//! let mut p = Pipeline::<AddToCartCtx, AppError>::new("add_to_cart", &[
//!   ("validate_cart_input", false),
//!   ("persist_cart", false),
//! ]);
//! p.on("validate_cart_input", |ctx| async move { Ok(PipelineControl::Continue) });
//! workflows.register(p);
//! workflows.run(ContextData::new(ctx)).await?;
//! ```

pub mod context;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::context::ContextData;
pub use crate::control::{PipelineControl, PipelineResult};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::{Handler, Pipeline};
pub use crate::registry::Workflows;
