use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::db::DbPool;
use crate::models::{CommitRecord, NewCommitRecord};
use crate::store::{ReadCache, StoreError};

/// Per-day commit statistics. An "active hour" is a clock hour containing at
/// least one commit, not elapsed duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
  pub count: i64,
  pub hours: i64,
}

/// Count commits landing on the given calendar day in local time, and the
/// distinct local clock hours among them.
pub fn stats_for_local_day(records: &[CommitRecord], date: NaiveDate) -> CommitStats {
  let mut hours: HashSet<u32> = HashSet::new();
  let mut count = 0i64;

  for record in records {
    let local = record.committed_at.with_timezone(&Local);
    if local.date_naive() == date {
      count += 1;
      hours.insert(local.hour());
    }
  }

  CommitStats {
    count,
    hours: hours.len() as i64,
  }
}

/// Synced commits, unique per (user, commit_hash). Insert-only; the sync
/// orchestrator is the single writer.
pub struct CommitStore {
  db: DbPool,
  records_cache: ReadCache<Vec<CommitRecord>>,
  stats_cache: ReadCache<CommitStats>,
}

impl CommitStore {
  pub fn new(db: DbPool) -> Self {
    Self {
      db,
      records_cache: ReadCache::new(),
      stats_cache: ReadCache::new(),
    }
  }

  /// Range read, newest first. Served from the cache within the TTL; a
  /// failed read logs and degrades to empty.
  pub async fn get_records(
    &self,
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Vec<CommitRecord> {
    let key = format!("records:{}:{}:{}", user_id, start, end);
    if let Some(cached) = self.records_cache.get(&key) {
      return cached;
    }

    let result: Result<Vec<CommitRecord>, sqlx::Error> = sqlx::query_as(
      "SELECT * FROM commit_records
         WHERE user_id = ?1 AND committed_at >= ?2 AND committed_at <= ?3
         ORDER BY committed_at DESC",
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(&self.db)
    .await;

    match result {
      Ok(records) => {
        self.records_cache.put(key, records.clone());
        records
      }
      Err(e) => {
        tracing::warn!("Commit record read failed, returning empty: {}", e);
        Vec::new()
      }
    }
  }

  /// Insert one synced commit. A (user, hash) conflict is a harmless no-op
  /// and returns Ok(false); any other failure propagates so the sync run can
  /// abandon. There is deliberately no existence pre-check.
  pub async fn insert(&self, record: &NewCommitRecord) -> Result<bool, StoreError> {
    self.records_cache.clear();
    self.stats_cache.clear();

    let result = sqlx::query(
      r#"
      INSERT INTO commit_records (user_id, repo_name, commit_hash, message, committed_at)
      VALUES (?1, ?2, ?3, ?4, ?5)
      ON CONFLICT(user_id, commit_hash) DO NOTHING
      "#,
    )
    .bind(&record.user_id)
    .bind(&record.repo_name)
    .bind(&record.commit_hash)
    .bind(&record.message)
    .bind(record.committed_at)
    .execute(&self.db)
    .await?;

    Ok(result.rows_affected() > 0)
  }

  /// Commit count and distinct active hours for one local calendar day
  pub async fn get_commit_stats(&self, user_id: &str, date: NaiveDate) -> CommitStats {
    let key = format!("stats:{}:{}", user_id, date);
    if let Some(cached) = self.stats_cache.get(&key) {
      return cached;
    }

    // Query a UTC window one day wide on each side, then bucket by local day
    let day_start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    let window_start = day_start - Duration::days(1);
    let window_end = day_start + Duration::days(2);

    let result: Result<Vec<CommitRecord>, sqlx::Error> = sqlx::query_as(
      "SELECT * FROM commit_records
         WHERE user_id = ?1 AND committed_at >= ?2 AND committed_at < ?3",
    )
    .bind(user_id)
    .bind(window_start)
    .bind(window_end)
    .fetch_all(&self.db)
    .await;

    match result {
      Ok(records) => {
        let stats = stats_for_local_day(&records, date);
        self.stats_cache.put(key, stats);
        stats
      }
      Err(e) => {
        tracing::warn!("Commit stats read failed, returning empty: {}", e);
        CommitStats::default()
      }
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::*;

  fn commit(user_id: &str, hash: &str, committed_at: DateTime<Utc>) -> NewCommitRecord {
    NewCommitRecord {
      user_id: user_id.to_string(),
      repo_name: "octocat/alpha".to_string(),
      commit_hash: hash.to_string(),
      message: Some("feat: thing".to_string()),
      committed_at,
    }
  }

  /// A UTC instant that falls at the given local wall-clock time today-ish
  fn local_instant(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
    Local
      .from_local_datetime(&naive)
      .single()
      .expect("unambiguous local time")
      .with_timezone(&Utc)
  }

  #[tokio::test]
  async fn test_insert_dedups_on_conflict() {
    let pool = setup_test_db().await;
    let store = CommitStore::new(pool.clone());

    let at = Utc::now();
    assert!(store.insert(&commit("user-1", "aaa111", at)).await.expect("insert"));
    // Same (user, hash) again: constraint absorbs it, no error
    assert!(!store.insert(&commit("user-1", "aaa111", at)).await.expect("insert"));
    // Same hash for a different user is a distinct row
    assert!(store.insert(&commit("user-2", "aaa111", at)).await.expect("insert"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commit_records")
      .fetch_one(&pool)
      .await
      .expect("count");
    assert_eq!(count, 2);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_get_records_newest_first_and_user_scoped() {
    let pool = setup_test_db().await;
    let store = CommitStore::new(pool.clone());

    let base = Utc::now();
    store.insert(&commit("user-1", "aaa", base - Duration::hours(2))).await.expect("insert");
    store.insert(&commit("user-1", "bbb", base)).await.expect("insert");
    store.insert(&commit("user-2", "ccc", base)).await.expect("insert");

    let records = store
      .get_records("user-1", base - Duration::days(1), base + Duration::days(1))
      .await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].commit_hash, "bbb");
    assert_eq!(records[1].commit_hash, "aaa");

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_stats_count_distinct_clock_hours() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    let records: Vec<CommitRecord> = [
      local_instant(date, 9, 10),
      local_instant(date, 9, 40),
      local_instant(date, 10, 5),
    ]
    .iter()
    .enumerate()
    .map(|(i, at)| CommitRecord {
      id: i as i64,
      user_id: "user-1".to_string(),
      repo_name: "octocat/alpha".to_string(),
      commit_hash: format!("hash-{}", i),
      message: None,
      committed_at: *at,
      created_at: None,
    })
    .collect();

    let stats = stats_for_local_day(&records, date);
    assert_eq!(stats.count, 3);
    assert_eq!(stats.hours, 2);

    // A neighboring day sees none of them
    let next_day = date.succ_opt().unwrap();
    assert_eq!(stats_for_local_day(&records, next_day), CommitStats::default());
  }

  #[tokio::test]
  async fn test_get_commit_stats_through_store() {
    let pool = setup_test_db().await;
    let store = CommitStore::new(pool.clone());

    let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    store.insert(&commit("user-1", "aaa", local_instant(date, 9, 10))).await.expect("insert");
    store.insert(&commit("user-1", "bbb", local_instant(date, 9, 40))).await.expect("insert");
    store.insert(&commit("user-1", "ccc", local_instant(date, 10, 5))).await.expect("insert");
    // Another user's commit on the same day is invisible
    store.insert(&commit("user-2", "ddd", local_instant(date, 9, 0))).await.expect("insert");

    let stats = store.get_commit_stats("user-1", date).await;
    assert_eq!(stats, CommitStats { count: 3, hours: 2 });

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_stats_cache_invalidated_by_write() {
    let pool = setup_test_db().await;
    let store = CommitStore::new(pool.clone());

    let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    store.insert(&commit("user-1", "aaa", local_instant(date, 9, 10))).await.expect("insert");
    assert_eq!(store.get_commit_stats("user-1", date).await.count, 1);

    // Bypassing the store leaves the cached stats stale
    seed_commit_record(&pool, "user-1", "zzz", local_instant(date, 11, 0)).await;
    assert_eq!(store.get_commit_stats("user-1", date).await.count, 1);

    // Any write through the store clears the whole cache
    store.insert(&commit("user-1", "bbb", local_instant(date, 12, 0))).await.expect("insert");
    assert_eq!(store.get_commit_stats("user-1", date).await.count, 3);

    teardown_test_db(pool).await;
  }
}
