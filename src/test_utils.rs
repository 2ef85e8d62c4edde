//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Row seeders that bypass the stores (and their caches)
//! - Mock data factories
//! - Helper assertions

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::NewActivityInsight;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  // Surface store warnings in test output when RUST_LOG asks for them
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .try_init();

  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Row Seeders (bypass the stores, so cached reads stay stale)
/// ---------------------------------------------------------------------------

/// Insert a sleep record directly, returning its id
pub async fn seed_sleep_record(
  pool: &SqlitePool,
  user_id: &str,
  date: NaiveDate,
  quality: i64,
) -> i64 {
  let ended_at = Utc::now();
  let started_at = ended_at - Duration::hours(8);

  let result = sqlx::query(
    r#"
    INSERT INTO sleep_records (user_id, date, started_at, ended_at, duration_hours, quality)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(user_id)
  .bind(date)
  .bind(started_at)
  .bind(ended_at)
  .bind(8.0)
  .bind(quality)
  .execute(pool)
  .await
  .expect("Failed to seed sleep record");

  result.last_insert_rowid()
}

/// Insert a commit record directly, returning its id
pub async fn seed_commit_record(
  pool: &SqlitePool,
  user_id: &str,
  commit_hash: &str,
  committed_at: DateTime<Utc>,
) -> i64 {
  let result = sqlx::query(
    r#"
    INSERT INTO commit_records (user_id, repo_name, commit_hash, message, committed_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
  )
  .bind(user_id)
  .bind("octocat/alpha")
  .bind(commit_hash)
  .bind("seeded commit")
  .bind(committed_at)
  .execute(pool)
  .await
  .expect("Failed to seed commit record");

  result.last_insert_rowid()
}

/// Insert an activity insight directly, returning its id
pub async fn seed_insight(
  pool: &SqlitePool,
  user_id: &str,
  date: NaiveDate,
  sleep_score: i64,
  productivity_score: i64,
) -> i64 {
  let result = sqlx::query(
    r#"
    INSERT INTO activity_insights
      (user_id, date, productivity_score, sleep_score, commit_count, active_hours)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(user_id)
  .bind(date)
  .bind(productivity_score)
  .bind(sleep_score)
  .bind(3)
  .bind(2)
  .execute(pool)
  .await
  .expect("Failed to seed insight");

  result.last_insert_rowid()
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Create an insight upsert payload for testing
pub fn mock_insight(
  user_id: &str,
  date: NaiveDate,
  sleep_score: Option<i64>,
  productivity_score: Option<i64>,
) -> NewActivityInsight {
  NewActivityInsight {
    user_id: user_id.to_string(),
    date,
    productivity_score,
    sleep_score,
    commit_count: 4,
    active_hours: 3,
    recommendations: Vec::new(),
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    // Verify key tables exist
    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN
         ('profiles', 'sleep_records', 'commit_records', 'activity_insights')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seeders_insert_rows() {
    let pool = setup_test_db().await;
    let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

    seed_sleep_record(&pool, "user-1", date, 80).await;
    seed_commit_record(&pool, "user-1", "abc123", Utc::now()).await;
    seed_insight(&pool, "user-1", date, 70, 75).await;

    let sleep: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sleep_records")
      .fetch_one(&pool)
      .await
      .expect("count");
    let commits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commit_records")
      .fetch_one(&pool)
      .await
      .expect("count");
    let insights: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_insights")
      .fetch_one(&pool)
      .await
      .expect("count");

    assert_eq!((sleep, commits, insights), (1, 1, 1));

    teardown_test_db(pool).await;
  }
}
