// storefront/src/web/extractors.rs

use crate::errors::AppError;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

/// Header set by the upstream authentication layer.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// The caller's identity, already authenticated upstream.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let user_id = req
      .headers()
      .get(USER_ID_HEADER)
      .and_then(|value| value.to_str().ok())
      .and_then(|raw| Uuid::parse_str(raw.trim()).ok());

    match user_id {
      Some(user_id) => ready(Ok(AuthenticatedUser { user_id })),
      None => {
        warn!("AuthenticatedUser extractor: Missing or invalid X-User-ID header.");
        ready(Err(AppError::Auth("Authentication required.".to_string())))
      }
    }
  }
}
