use crate::db::DbPool;
use crate::github::GithubProfile;
use crate::models::{NewProfile, Profile};
use crate::store::ReadCache;

/// Dashboard profiles, one per auth identity.
pub struct ProfileStore {
  db: DbPool,
  cache: ReadCache<Option<Profile>>,
}

impl ProfileStore {
  pub fn new(db: DbPool) -> Self {
    Self {
      db,
      cache: ReadCache::new(),
    }
  }

  /// Point read. Served from the cache within the TTL; a failed read logs
  /// and degrades to None.
  pub async fn get(&self, user_id: &str) -> Option<Profile> {
    let key = format!("profile:{}", user_id);
    if let Some(cached) = self.cache.get(&key) {
      return cached;
    }

    let result: Result<Option<Profile>, sqlx::Error> =
      sqlx::query_as("SELECT * FROM profiles WHERE user_id = ?1")
        .bind(user_id)
        .fetch_optional(&self.db)
        .await;

    match result {
      Ok(profile) => {
        self.cache.put(key, profile.clone());
        profile
      }
      Err(e) => {
        tracing::warn!("Profile read failed: {}", e);
        None
      }
    }
  }

  /// Insert-or-replace the user's profile (goal edits from the settings
  /// page). Returns the stored row, or None when the write failed.
  pub async fn upsert(&self, profile: &NewProfile) -> Option<Profile> {
    self.cache.clear();

    let result: Result<Profile, sqlx::Error> = sqlx::query_as(
      r#"
      INSERT INTO profiles
        (user_id, github_username, display_name, avatar_url, sleep_goal_hours, daily_commit_goal)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6)
      ON CONFLICT(user_id) DO UPDATE SET
        github_username = excluded.github_username,
        display_name = excluded.display_name,
        avatar_url = excluded.avatar_url,
        sleep_goal_hours = excluded.sleep_goal_hours,
        daily_commit_goal = excluded.daily_commit_goal,
        updated_at = CURRENT_TIMESTAMP
      RETURNING *
      "#,
    )
    .bind(&profile.user_id)
    .bind(&profile.github_username)
    .bind(&profile.display_name)
    .bind(&profile.avatar_url)
    .bind(profile.sleep_goal_hours)
    .bind(profile.daily_commit_goal)
    .fetch_one(&self.db)
    .await;

    match result {
      Ok(stored) => Some(stored),
      Err(e) => {
        tracing::warn!("Profile upsert failed: {}", e);
        None
      }
    }
  }

  /// Create the profile row on first sign-in, keeping an existing one
  /// untouched. GitHub fields come from the authenticated profile; goals
  /// start at their defaults.
  pub async fn ensure(&self, user_id: &str, github: &GithubProfile) -> Option<Profile> {
    self.cache.clear();

    let result = sqlx::query(
      r#"
      INSERT INTO profiles (user_id, github_username, display_name, avatar_url)
      VALUES (?1, ?2, ?3, ?4)
      ON CONFLICT(user_id) DO NOTHING
      "#,
    )
    .bind(user_id)
    .bind(&github.login)
    .bind(&github.name)
    .bind(&github.avatar_url)
    .execute(&self.db)
    .await;

    if let Err(e) = result {
      tracing::warn!("Profile ensure failed: {}", e);
      return None;
    }

    self.get(user_id).await
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
