// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
      "memory" => Ok(StoreBackend::Memory),
      other => Err(AppError::Config(format!("Invalid STORE_BACKEND '{}': expected postgres or memory", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "text" => Ok(LogFormat::Text),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected text or json", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  /// Required when `store_backend` is Postgres.
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub run_migrations: bool,
  pub seed_db: bool,
  /// Extra attempts after an optimistic-concurrency conflict on a cart write.
  pub max_write_retries: u32,
  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      store_backend: StoreBackend::Postgres,
      database_url: None,
      database_max_connections: 5,
      run_migrations: true,
      seed_db: false,
      max_write_retries: 3,
      log_format: LogFormat::Text,
    }
  }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(var_name) {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    None => Ok(default),
  }
}

impl AppConfig {
  /// Loads `.env` if present, then reads the process environment.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let config = Self::from_lookup(|var_name| env::var(var_name).ok())?;
    tracing::info!(
      server_host = %config.server_host,
      server_port = config.server_port,
      store_backend = ?config.store_backend,
      "Application configuration loaded successfully."
    );
    Ok(config)
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();

    let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_or(&lookup, "SERVER_PORT", defaults.server_port)?;
    let store_backend = parse_or(&lookup, "STORE_BACKEND", defaults.store_backend)?;
    let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
    let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.database_max_connections)?;
    let run_migrations = parse_or(&lookup, "RUN_MIGRATIONS", defaults.run_migrations)?;
    let seed_db = parse_or(&lookup, "SEED_DB", defaults.seed_db)?;
    let max_write_retries = parse_or(&lookup, "MAX_WRITE_RETRIES", defaults.max_write_retries)?;
    let log_format = parse_or(&lookup, "LOG_FORMAT", defaults.log_format)?;

    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required for STORE_BACKEND=postgres)".to_string(),
      ));
    }
    if database_max_connections == 0 {
      return Err(AppError::Config("DATABASE_MAX_CONNECTIONS must be at least 1".to_string()));
    }

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      database_max_connections,
      run_migrations,
      seed_db,
      max_write_retries,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
