//! GitHub integration for commit activity and profile data
//!
//! The OAuth dance happens in the auth collaborator; by the time this client
//! runs, the session already carries a provider token. This module binds a
//! REST client to that token and pulls push events and the authenticated
//! profile.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use url::Url;

use crate::auth::SessionHub;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = "devpulse";
const EVENTS_PER_PAGE: u32 = 100;
const PUSH_EVENT_KIND: &str = "PushEvent";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GithubError {
  #[error("No GitHub token available for the current session")]
  NoToken,

  #[error("GitHub request failed: {0}")]
  Fetch(String),
}

impl From<reqwest::Error> for GithubError {
  fn from(e: reqwest::Error) -> Self {
    GithubError::Fetch(e.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// API Data Structures
/// ---------------------------------------------------------------------------

/// Public profile of the authenticated identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubProfile {
  pub login: String,
  pub name: Option<String>,
  pub avatar_url: Option<String>,
}

/// One push to a repository, carrying at least one commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
  pub repo_name: String,
  /// When the push happened; rarely absent in practice
  pub created_at: Option<DateTime<Utc>>,
  pub commits: Vec<PushCommit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushCommit {
  pub sha: String,
  pub message: Option<String>,
}

/// Raw activity event from the events API; non-push kinds carry no commits
#[derive(Debug, Deserialize)]
struct RawEvent {
  #[serde(rename = "type")]
  kind: String,
  repo: RawRepo,
  #[serde(default)]
  payload: RawPayload,
  created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawRepo {
  name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawPayload {
  #[serde(default)]
  commits: Vec<RawCommit>,
}

#[derive(Debug, Deserialize)]
struct RawCommit {
  sha: String,
  message: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Client
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct BoundIdentity {
  token: String,
  login: String,
}

/// REST client bound to the signed-in identity's token.
///
/// `initialize` is idempotent while a token remains bound; `refresh` forces a
/// re-bind after an external token rotation. No retries, no pagination beyond
/// the first page.
pub struct GithubClient {
  http: Client,
  base_url: String,
  session: Arc<SessionHub>,
  bound: Mutex<Option<BoundIdentity>>,
}

impl GithubClient {
  pub fn new(session: Arc<SessionHub>) -> Self {
    Self::with_base_url(session, GITHUB_API_BASE)
  }

  /// Point the client at a different API host (used by tests)
  pub fn with_base_url(session: Arc<SessionHub>, base_url: impl Into<String>) -> Self {
    Self {
      http: Client::new(),
      base_url: base_url.into(),
      session,
      bound: Mutex::new(None),
    }
  }

  pub fn is_initialized(&self) -> bool {
    self.bound.lock().expect("github binding lock").is_some()
  }

  /// Bind to the session's current token, fetching the profile once to learn
  /// the login. A no-op while already bound.
  pub async fn initialize(&self) -> Result<(), GithubError> {
    if self.is_initialized() {
      return Ok(());
    }

    let token = self.session.provider_token().ok_or(GithubError::NoToken)?;
    let profile = self.fetch_profile(&token).await?;

    *self.bound.lock().expect("github binding lock") = Some(BoundIdentity {
      token,
      login: profile.login,
    });

    Ok(())
  }

  /// Drop the current binding and re-run `initialize`. Used after an external
  /// token rotation.
  pub async fn refresh(&self) -> Result<(), GithubError> {
    self.unbind();
    self.initialize().await
  }

  pub fn unbind(&self) {
    *self.bound.lock().expect("github binding lock") = None;
  }

  async fn ensure_bound(&self) -> Result<BoundIdentity, GithubError> {
    self.initialize().await?;
    self
      .bound
      .lock()
      .expect("github binding lock")
      .clone()
      .ok_or(GithubError::NoToken)
  }

  /// Fetch the authenticated identity's public profile
  pub async fn get_authenticated_profile(&self) -> Result<GithubProfile, GithubError> {
    let bound = self.ensure_bound().await?;
    self.fetch_profile(&bound.token).await
  }

  async fn fetch_profile(&self, token: &str) -> Result<GithubProfile, GithubError> {
    let url = format!("{}/user", self.base_url);

    let response = self
      .http
      .get(&url)
      .bearer_auth(token)
      .header("User-Agent", USER_AGENT)
      .header("Accept", GITHUB_ACCEPT)
      .send()
      .await?;

    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      return Err(GithubError::Fetch(format!(
        "Profile API error {}: {}",
        status, error_text
      )));
    }

    Ok(response.json().await?)
  }

  /// Fetch up to 100 most recent activity events since the given time and
  /// keep the push events that carry at least one commit. First page only.
  pub async fn list_recent_push_events(
    &self,
    since: DateTime<Utc>,
  ) -> Result<Vec<PushEvent>, GithubError> {
    let bound = self.ensure_bound().await?;

    let mut url = Url::parse(&format!("{}/users/{}/events", self.base_url, bound.login))
      .map_err(|e| GithubError::Fetch(e.to_string()))?;
    url
      .query_pairs_mut()
      .append_pair("since", &since.to_rfc3339())
      .append_pair("per_page", &EVENTS_PER_PAGE.to_string());

    let response = self
      .http
      .get(url.as_str())
      .bearer_auth(&bound.token)
      .header("User-Agent", USER_AGENT)
      .header("Accept", GITHUB_ACCEPT)
      .send()
      .await?;

    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      return Err(GithubError::Fetch(format!(
        "Events API error {}: {}",
        status, error_text
      )));
    }

    let response_text = response.text().await?;

    let events: Vec<RawEvent> = serde_json::from_str(&response_text).map_err(|e| {
      tracing::warn!("Failed to parse events response: {}", e);
      GithubError::Fetch(format!("Failed to parse events: {}", e))
    })?;

    let push_events = events
      .into_iter()
      .filter(|e| e.kind == PUSH_EVENT_KIND && !e.payload.commits.is_empty())
      .map(|e| PushEvent {
        repo_name: e.repo.name,
        created_at: e.created_at,
        commits: e
          .payload
          .commits
          .into_iter()
          .map(|c| PushCommit {
            sha: c.sha,
            message: c.message,
          })
          .collect(),
      })
      .collect();

    Ok(push_events)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
