use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Daily insight produced by the external analysis job, unique per
/// (user, date). The dashboard consumes these read-only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityInsight {
  pub id: i64,
  pub user_id: String,
  pub date: NaiveDate,
  /// Productivity score in [0, 100]
  pub productivity_score: Option<i64>,
  /// Sleep score in [0, 100]
  pub sleep_score: Option<i64>,
  pub commit_count: i64,
  pub active_hours: i64,
  /// JSON-encoded string array
  pub recommendations: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl ActivityInsight {
  /// Decode the stored recommendation list, empty when absent or malformed
  pub fn recommendation_list(&self) -> Vec<String> {
    self
      .recommendations
      .as_deref()
      .and_then(|raw| serde_json::from_str(raw).ok())
      .unwrap_or_default()
  }
}

/// For upserting insights (without id, timestamps). The write path belongs to
/// the external analysis job; nothing in the dashboard core calls it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivityInsight {
  pub user_id: String,
  pub date: NaiveDate,
  pub productivity_score: Option<i64>,
  pub sleep_score: Option<i64>,
  pub commit_count: i64,
  pub active_hours: i64,
  pub recommendations: Vec<String>,
}

impl NewActivityInsight {
  pub fn recommendations_json(&self) -> String {
    serde_json::to_string(&self.recommendations).unwrap_or_default()
  }
}
