//! Commit sync: copies recent GitHub push events into the commit table.
//!
//! One row per embedded commit, sequential, no batching. Dedup is the commit
//! store's unique (user, hash) constraint; this module never pre-checks
//! existence.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::auth::{SessionEvent, SessionHub};
use crate::github::GithubClient;
use crate::models::NewCommitRecord;
use crate::store::{CommitStore, ProfileStore};

const SYNC_LOOKBACK_DAYS: i64 = 30;

/// Copy the last 30 days of push-event commits into the commit store.
///
/// Any failure abandons the run and returns false; rows written before the
/// failure are kept. There is no rollback and no resumption checkpoint.
pub async fn sync_commits(client: &GithubClient, commits: &CommitStore, user_id: &str) -> bool {
  let since = Utc::now() - Duration::days(SYNC_LOOKBACK_DAYS);

  let events = match client.list_recent_push_events(since).await {
    Ok(events) => events,
    Err(e) => {
      tracing::warn!("Commit sync aborted, event fetch failed: {}", e);
      return false;
    }
  };

  let mut new_count = 0usize;
  let mut total = 0usize;

  for event in &events {
    for commit in &event.commits {
      total += 1;

      let record = NewCommitRecord {
        user_id: user_id.to_string(),
        repo_name: event.repo_name.clone(),
        commit_hash: commit.sha.clone(),
        message: commit.message.clone(),
        // Events without a timestamp stamp their commits with the sync time
        committed_at: event.created_at.unwrap_or_else(Utc::now),
      };

      match commits.insert(&record).await {
        Ok(true) => new_count += 1,
        Ok(false) => {} // already synced, constraint absorbed it
        Err(e) => {
          tracing::warn!("Commit sync abandoned mid-run: {}", e);
          return false;
        }
      }
    }
  }

  tracing::info!("Commit sync complete: {} new commits (saw {})", new_count, total);
  true
}

/// React to session changes from the auth collaborator: sign-in initializes
/// the client, ensures the profile row, and runs a sync; a token refresh
/// re-binds the client and re-syncs; sign-out unbinds.
pub fn spawn_sync_trigger(
  hub: &SessionHub,
  client: Arc<GithubClient>,
  commits: Arc<CommitStore>,
  profiles: Arc<ProfileStore>,
) -> JoinHandle<()> {
  let mut events = hub.subscribe();

  tokio::spawn(async move {
    loop {
      match events.recv().await {
        Ok(SessionEvent::SignedIn(session)) => {
          if let Err(e) = client.initialize().await {
            tracing::warn!("GitHub client initialization failed: {}", e);
            continue;
          }

          match client.get_authenticated_profile().await {
            Ok(profile) => {
              profiles.ensure(&session.user_id, &profile).await;
            }
            Err(e) => tracing::warn!("Profile fetch failed: {}", e),
          }

          sync_commits(&client, &commits, &session.user_id).await;
        }
        Ok(SessionEvent::TokenRefreshed(session)) => {
          if let Err(e) = client.refresh().await {
            tracing::warn!("GitHub client refresh failed: {}", e);
            continue;
          }
          sync_commits(&client, &commits, &session.user_id).await;
        }
        Ok(SessionEvent::SignedOut) => client.unbind(),
        Err(RecvError::Lagged(skipped)) => {
          tracing::warn!("Sync trigger lagged, dropped {} session events", skipped);
        }
        Err(RecvError::Closed) => break,
      }
    }
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
