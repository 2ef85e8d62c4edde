//! Record stores: thin data access over the relational tables, each with a
//! short-lived read-through cache.
//!
//! Failure policy: reads log and degrade to an empty result, so callers see
//! "no data" and "store unreachable" the same way. Writes invalidate the
//! owning store's entire cache, not individual keys.

pub mod commit;
pub mod insight;
pub mod profile;
pub mod sleep;

pub use commit::{CommitStats, CommitStore};
pub use insight::InsightStore;
pub use profile::ProfileStore;
pub use sleep::SleepStore;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long a populated cache entry stays valid
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(String),
}

impl From<sqlx::Error> for StoreError {
  fn from(e: sqlx::Error) -> Self {
    StoreError::Database(e.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Read Cache
/// ---------------------------------------------------------------------------

struct CacheEntry<T> {
  value: T,
  populated_at: Instant,
}

/// Plain key -> (value, populated-at) map. Entries are valid for the TTL
/// from their last population; `clear` wipes the whole map.
pub struct ReadCache<T> {
  entries: Mutex<HashMap<String, CacheEntry<T>>>,
  ttl: Duration,
}

impl<T: Clone> ReadCache<T> {
  pub fn new() -> Self {
    Self::with_ttl(CACHE_TTL)
  }

  pub fn with_ttl(ttl: Duration) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      ttl,
    }
  }

  pub fn get(&self, key: &str) -> Option<T> {
    let entries = self.entries.lock().expect("cache lock");
    entries
      .get(key)
      .filter(|entry| entry.populated_at.elapsed() < self.ttl)
      .map(|entry| entry.value.clone())
  }

  pub fn put(&self, key: impl Into<String>, value: T) {
    self.entries.lock().expect("cache lock").insert(
      key.into(),
      CacheEntry {
        value,
        populated_at: Instant::now(),
      },
    );
  }

  pub fn clear(&self) {
    self.entries.lock().expect("cache lock").clear();
  }
}

impl<T: Clone> Default for ReadCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
