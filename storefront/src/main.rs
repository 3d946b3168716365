// storefront/src/main.rs

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use storefront::config::{AppConfig, LogFormat, StoreBackend};
use storefront::seed::seed_catalog;
use storefront::state::AppState;
use storefront::store::{MemoryStore, PgStore, Store};
use storefront::web::configure_app_routes;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_format: LogFormat) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_span_events(FmtSpan::CLOSE);
  match log_format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
  match config.store_backend {
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on shutdown.");
      Ok(Arc::new(MemoryStore::new()))
    }
    StoreBackend::Postgres => {
      let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres backend")?;
      let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to the database")?;
      tracing::info!("Successfully connected to the database.");

      let store = PgStore::new(pool);
      if config.run_migrations {
        store.migrate().await.context("Failed to run database migrations")?;
      }
      Ok(Arc::new(store))
    }
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // The log format is part of the config, so the subscriber starts after it.
  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  init_tracing(app_config.log_format);
  tracing::info!("Starting storefront server...");

  let store = build_store(&app_config).await?;
  if app_config.seed_db {
    seed_catalog(store.as_ref()).await.context("Failed to seed database")?;
  }

  let server_address = app_config.bind_address();
  let app_state = AppState::new(store, app_config).context("Failed to build application state")?;

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
