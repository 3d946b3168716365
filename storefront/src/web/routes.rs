// storefront/src/web/routes.rs

use crate::errors::AppError;
use crate::web::handlers::{cart_handlers, order_handlers, product_handlers};
use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed JSON bodies become the same 400 `{"error": ...}` as other validation failures.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler));
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::resource("/cart")
          .route(web::get().to(cart_handlers::get_cart_handler))
          .route(web::post().to(cart_handlers::add_to_cart_handler)),
      )
      .service(
        web::scope("/orders")
          .service(
            web::resource("")
              .route(web::post().to(order_handlers::place_order_handler))
              .route(web::get().to(order_handlers::list_orders_handler)),
          )
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      ),
  );
}
