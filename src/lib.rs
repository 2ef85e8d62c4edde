//! Core of a personal developer-wellness dashboard.
//!
//! Links a GitHub identity, syncs recent commit activity into SQLite, stores
//! user-logged sleep records, consumes externally produced daily insights,
//! and derives the aggregate statistics the dashboard renders. The UI,
//! routing, and OAuth sign-in flow live outside this crate.

pub mod auth;
pub mod db;
pub mod github;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod store;
pub mod sync;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use auth::SessionHub;
use db::DbPool;
use github::GithubClient;
use store::{CommitStore, InsightStore, ProfileStore, SleepStore};

/// Everything a front end needs, wired together over one pool
pub struct Dashboard {
  pub session: Arc<SessionHub>,
  pub github: Arc<GithubClient>,
  pub profiles: Arc<ProfileStore>,
  pub sleep: Arc<SleepStore>,
  pub commits: Arc<CommitStore>,
  pub insights: Arc<InsightStore>,
}

impl Dashboard {
  pub fn new(db: DbPool) -> Self {
    let session = Arc::new(SessionHub::new());
    let github = Arc::new(GithubClient::new(session.clone()));

    Self {
      github,
      profiles: Arc::new(ProfileStore::new(db.clone())),
      sleep: Arc::new(SleepStore::new(db.clone())),
      commits: Arc::new(CommitStore::new(db.clone())),
      insights: Arc::new(InsightStore::new(db)),
      session,
    }
  }

  /// Start the background task that reacts to session changes (sign-in and
  /// token refresh kick off commit syncs)
  pub fn start_sync_trigger(&self) -> tokio::task::JoinHandle<()> {
    sync::spawn_sync_trigger(
      &self.session,
      self.github.clone(),
      self.commits.clone(),
      self.profiles.clone(),
    )
  }
}
