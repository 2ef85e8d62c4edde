use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A synced commit, unique per (user, commit_hash).
///
/// Written only by the sync orchestrator and never updated; the hash is the
/// natural dedup key.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommitRecord {
  pub id: i64,
  pub user_id: String,
  pub repo_name: String,
  pub commit_hash: String,
  pub message: Option<String>,
  pub committed_at: DateTime<Utc>,
  pub created_at: Option<DateTime<Utc>>,
}

/// For inserting new commit records (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommitRecord {
  pub user_id: String,
  pub repo_name: String,
  pub commit_hash: String,
  pub message: Option<String>,
  pub committed_at: DateTime<Utc>,
}
