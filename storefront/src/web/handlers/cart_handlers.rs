// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

/// Both fields are optional so a missing one is reported as a validation
/// error instead of a deserialization failure.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: Option<Uuid>,
  #[serde(default, deserialize_with = "quantity_from_number_or_string")]
  pub quantity: Option<i32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
  Number(i64),
  Text(String),
}

/// Accepts `3` as well as `"3"`.
fn quantity_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<NumberOrString>::deserialize(deserializer)? {
    None => Ok(None),
    Some(NumberOrString::Number(n)) => i32::try_from(n)
      .map(Some)
      .map_err(|_| de::Error::custom("quantity is out of range")),
    Some(NumberOrString::Text(raw)) => raw
      .trim()
      .parse::<i32>()
      .map(Some)
      .map_err(|_| de::Error::custom(format!("invalid quantity '{}'", raw))),
  }
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user_id)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let (product_id, quantity) = match (req_payload.product_id, req_payload.quantity) {
    (Some(product_id), Some(quantity)) => (product_id, quantity),
    _ => return Err(AppError::Validation("Please provide productId and quantity".to_string())),
  };

  info!(%product_id, quantity, "Add to cart attempt.");
  let view = services::add_to_cart(&app_state, auth_user.user_id, product_id, quantity).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let view = services::get_cart(&app_state, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(view))
}
