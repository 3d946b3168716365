// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use storefront_flow::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Insufficient stock for product: {product_name} (requested {requested}, available {available})")]
  InsufficientStock {
    product_name: String,
    requested: i32,
    available: i32,
  },

  #[error("No items in cart")]
  EmptyCart,

  /// A concurrent writer changed the cart between read and write.
  #[error("Concurrent modification: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl AppError {
  fn client_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) | AppError::Conflict(m) => m.clone(),
      AppError::InsufficientStock { product_name, .. } => format!("Insufficient stock for product: {}", product_name),
      AppError::EmptyCart => "No items in cart".to_string(),
      AppError::Sqlx(_) => "Database operation failed".to_string(),
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) | AppError::PipelineHaltedByHandler => {
        "An internal error occurred".to_string()
      }
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::InsufficientStock { .. } | AppError::EmptyCart => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_)
      | AppError::PipelineHaltedByHandler => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }
    HttpResponse::build(status).json(json!({ "error": self.client_message() }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
