use chrono::NaiveDate;

use crate::db::DbPool;
use crate::models::{ActivityInsight, NewActivityInsight};
use crate::store::ReadCache;

/// Daily insights, unique per (user, date). The dashboard only reads these;
/// the upsert path belongs to the external analysis job that produces them.
pub struct InsightStore {
  db: DbPool,
  cache: ReadCache<Vec<ActivityInsight>>,
}

impl InsightStore {
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
  ) -> Vec<ActivityInsight> {
    let key = format!("records:{}:{}:{}", user_id, start, end);
    if let Some(cached) = self.cache.get(&key) {
      return cached;
    }

    let result: Result<Vec<ActivityInsight>, sqlx::Error> = sqlx::query_as(
      "SELECT * FROM activity_insights
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
        tracing::warn!("Insight read failed, returning empty: {}", e);
        Vec::new()
      }
    }
  }

  /// Insert-or-replace the insight for (user, date). Returns the stored row,
  /// or None when the write failed.
  pub async fn upsert(&self, insight: &NewActivityInsight) -> Option<ActivityInsight> {
    self.cache.clear();

    let result: Result<ActivityInsight, sqlx::Error> = sqlx::query_as(
      r#"
      INSERT INTO activity_insights
        (user_id, date, productivity_score, sleep_score, commit_count, active_hours, recommendations)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
      ON CONFLICT(user_id, date) DO UPDATE SET
        productivity_score = excluded.productivity_score,
        sleep_score = excluded.sleep_score,
        commit_count = excluded.commit_count,
        active_hours = excluded.active_hours,
        recommendations = excluded.recommendations,
        updated_at = CURRENT_TIMESTAMP
      RETURNING *
      "#,
    )
    .bind(&insight.user_id)
    .bind(insight.date)
    .bind(insight.productivity_score)
    .bind(insight.sleep_score)
    .bind(insight.commit_count)
    .bind(insight.active_hours)
    .bind(insight.recommendations_json())
    .fetch_one(&self.db)
    .await;

    match result {
      Ok(stored) => Some(stored),
      Err(e) => {
        tracing::warn!("Insight upsert failed: {}", e);
        None
      }
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
