use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dashboard profile, one per auth identity.
///
/// Created automatically the first time an identity signs in; the GitHub
/// fields are filled from the authenticated profile and the goals are edited
/// by the user afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
  pub user_id: String,
  pub github_username: Option<String>,
  pub display_name: Option<String>,
  pub avatar_url: Option<String>,
  pub sleep_goal_hours: f64,
  pub daily_commit_goal: i64,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// For inserting or replacing a profile (without timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
  pub user_id: String,
  pub github_username: Option<String>,
  pub display_name: Option<String>,
  pub avatar_url: Option<String>,
  pub sleep_goal_hours: f64,
  pub daily_commit_goal: i64,
}

impl NewProfile {
  /// A fresh profile with default goals for a just-signed-in identity
  pub fn with_defaults(user_id: &str) -> Self {
    Self {
      user_id: user_id.to_string(),
      github_username: None,
      display_name: None,
      avatar_url: None,
      sleep_goal_hours: 8.0,
      daily_commit_goal: 5,
    }
  }
}
