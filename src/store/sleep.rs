use chrono::NaiveDate;

use crate::db::DbPool;
use crate::models::{NewSleepRecord, SleepRecord};
use crate::store::ReadCache;

/// Sleep records, unique per (user, date). Created, edited, and deleted by
/// the user through the sleep page.
pub struct SleepStore {
  db: DbPool,
  cache: ReadCache<Vec<SleepRecord>>,
}

impl SleepStore {
  pub fn new(db: DbPool) -> Self {
    Self {
      db,
      cache: ReadCache::new(),
    }
  }

  /// Range read, newest first. Served from the cache within the TTL; a
  /// failed read logs and degrades to empty.
  pub async fn get_records(
    &self,
    user_id: &str,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Vec<SleepRecord> {
    let key = format!("records:{}:{}:{}", user_id, start, end);
    if let Some(cached) = self.cache.get(&key) {
      return cached;
    }

    let result: Result<Vec<SleepRecord>, sqlx::Error> = sqlx::query_as(
      "SELECT * FROM sleep_records
         WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date DESC",
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(&self.db)
    .await;

    match result {
      Ok(records) => {
        self.cache.put(key, records.clone());
        records
      }
      Err(e) => {
        tracing::warn!("Sleep record read failed, returning empty: {}", e);
        Vec::new()
      }
    }
  }

  /// Insert one night. Duration is derived from the start/end pair here.
  /// Returns the stored row, or None when the write failed.
  pub async fn insert(&self, record: &NewSleepRecord) -> Option<SleepRecord> {
    self.cache.clear();

    let result: Result<SleepRecord, sqlx::Error> = sqlx::query_as(
      r#"
      INSERT INTO sleep_records (user_id, date, started_at, ended_at, duration_hours, quality, notes)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
      RETURNING *
      "#,
    )
    .bind(&record.user_id)
    .bind(record.date)
    .bind(record.started_at)
    .bind(record.ended_at)
    .bind(record.duration_hours())
    .bind(record.quality)
    .bind(&record.notes)
    .fetch_one(&self.db)
    .await;

    match result {
      Ok(stored) => Some(stored),
      Err(e) => {
        tracing::warn!("Sleep record insert failed: {}", e);
        None
      }
    }
  }

  /// Update a record the user owns. Returns the stored row, or None when the
  /// row is missing or the write failed.
  pub async fn update(
    &self,
    id: i64,
    user_id: &str,
    record: &NewSleepRecord,
  ) -> Option<SleepRecord> {
    self.cache.clear();

    let result: Result<Option<SleepRecord>, sqlx::Error> = sqlx::query_as(
      r#"
      UPDATE sleep_records
        SET date = ?1, started_at = ?2, ended_at = ?3, duration_hours = ?4,
            quality = ?5, notes = ?6, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?7 AND user_id = ?8
      RETURNING *
      "#,
    )
    .bind(record.date)
    .bind(record.started_at)
    .bind(record.ended_at)
    .bind(record.duration_hours())
    .bind(record.quality)
    .bind(&record.notes)
    .bind(id)
    .bind(user_id)
    .fetch_optional(&self.db)
    .await;

    match result {
      Ok(stored) => stored,
      Err(e) => {
        tracing::warn!("Sleep record update failed: {}", e);
        None
      }
    }
  }

  /// Delete a record the user owns. False when nothing was deleted.
  pub async fn delete(&self, id: i64, user_id: &str) -> bool {
    self.cache.clear();

    let result = sqlx::query("DELETE FROM sleep_records WHERE id = ?1 AND user_id = ?2")
      .bind(id)
      .bind(user_id)
      .execute(&self.db)
      .await;

    match result {
      Ok(done) => done.rows_affected() > 0,
      Err(e) => {
        tracing::warn!("Sleep record delete failed: {}", e);
        false
      }
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
