//! Guard for applying results of in-flight page loads.
//!
//! A superseded load is never aborted; when the viewer navigates away, the
//! completed fetch simply finds the guard released and drops its result
//! instead of writing state nobody is looking at.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared "still interested" flag scoped to one view of the data
#[derive(Debug, Clone)]
pub struct LoadGuard {
  active: Arc<AtomicBool>,
}

impl LoadGuard {
  pub fn new() -> Self {
    Self {
      active: Arc::new(AtomicBool::new(true)),
    }
  }

  pub fn is_active(&self) -> bool {
    self.active.load(Ordering::Acquire)
  }

  /// The viewer went away; results arriving after this are dropped
  pub fn release(&self) {
    self.active.store(false, Ordering::Release);
  }

  /// Run the sink with the fetched value only while the guard is active.
  /// Returns whether the value was applied.
  pub fn apply<T>(&self, value: T, sink: impl FnOnce(T)) -> bool {
    if !self.is_active() {
      return false;
    }
    sink(value);
    true
  }
}

impl Default for LoadGuard {
  fn default() -> Self {
    Self::new()
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
