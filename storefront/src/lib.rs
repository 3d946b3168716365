// storefront/src/lib.rs

//! Cart and order backend for a small storefront.
//!
//! Adding to a cart and checking out are pipelines registered in a
//! `storefront_flow::Workflows` registry; the [`services`] run them and the
//! [`web`] layer exposes them over actix-web.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
