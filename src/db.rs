use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::env;

pub type DbPool = SqlitePool;

const DEFAULT_DATABASE_URL: &str = "sqlite://devpulse.db?mode=rwc";

/// Database location, read from the environment
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
  pub url: String,
}

impl DatabaseConfig {
  /// Read `DATABASE_URL`, falling back to a local `devpulse.db` file
  pub fn from_env() -> Self {
    dotenvy::dotenv().ok();

    let url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    Self { url }
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &DatabaseConfig) -> Result<DbPool, Box<dyn std::error::Error>> {
  tracing::info!("Initializing database at: {}", config.url);

  // Create connection pool
  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&config.url)
    .await?;

  // Run migrations
  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("Database initialized successfully");

  Ok(pool)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
