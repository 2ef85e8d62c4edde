use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One night of sleep, unique per (user, date).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SleepRecord {
  pub id: i64,
  pub user_id: String,
  pub date: NaiveDate,
  pub started_at: DateTime<Utc>,
  pub ended_at: DateTime<Utc>,
  pub duration_hours: f64,
  /// Quality score in [0, 100]
  pub quality: i64,
  pub notes: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// For inserting new sleep records (without id, timestamps).
/// Duration is derived from started_at/ended_at at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSleepRecord {
  pub user_id: String,
  pub date: NaiveDate,
  pub started_at: DateTime<Utc>,
  pub ended_at: DateTime<Utc>,
  pub quality: i64,
  pub notes: Option<String>,
}

impl NewSleepRecord {
  /// Hours slept, from the start/end pair
  pub fn duration_hours(&self) -> f64 {
    (self.ended_at - self.started_at).num_seconds() as f64 / 3600.0
  }
}
