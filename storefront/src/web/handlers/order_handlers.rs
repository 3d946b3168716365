// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::place_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = services::place_order(&app_state, auth_user.user_id).await?;
  info!(order_id = %order.id, "Checkout completed.");
  Ok(HttpResponse::Created().json(order))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = services::list_orders(&app_state, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::get_order", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = services::get_order(&app_state, auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}
