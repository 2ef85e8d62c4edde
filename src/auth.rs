//! Session state from the auth collaborator
//!
//! The OAuth sign-in flow itself lives outside this crate. The embedding
//! front end pushes session changes into the hub; the sync trigger and the
//! GitHub client read from it.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// A signed-in identity together with its embedded provider token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub user_id: String,
  /// GitHub access token issued by the OAuth provider, when granted
  pub provider_token: Option<String>,
}

/// Session-change notifications broadcast to subscribers
#[derive(Debug, Clone)]
pub enum SessionEvent {
  SignedIn(Session),
  SignedOut,
  TokenRefreshed(Session),
}

/// Holds the current session and fans out change events.
///
/// Reads are plain snapshots of the held state; there is no caching beyond
/// what the auth collaborator already did to produce the session.
pub struct SessionHub {
  current: Mutex<Option<Session>>,
  events: broadcast::Sender<SessionEvent>,
}

impl SessionHub {
  pub fn new() -> Self {
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    Self {
      current: Mutex::new(None),
      events,
    }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
    self.events.subscribe()
  }

  pub fn sign_in(&self, session: Session) {
    *self.current.lock().expect("session lock") = Some(session.clone());
    let _ = self.events.send(SessionEvent::SignedIn(session));
  }

  pub fn token_refreshed(&self, session: Session) {
    *self.current.lock().expect("session lock") = Some(session.clone());
    let _ = self.events.send(SessionEvent::TokenRefreshed(session));
  }

  pub fn sign_out(&self) {
    *self.current.lock().expect("session lock") = None;
    let _ = self.events.send(SessionEvent::SignedOut);
  }

  pub fn session(&self) -> Option<Session> {
    self.current.lock().expect("session lock").clone()
  }

  pub fn user_id(&self) -> Option<String> {
    self.session().map(|s| s.user_id)
  }

  /// The current GitHub access token, when the session holds one
  pub fn provider_token(&self) -> Option<String> {
    self.session().and_then(|s| s.provider_token)
  }
}

impl Default for SessionHub {
  fn default() -> Self {
    Self::new()
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
