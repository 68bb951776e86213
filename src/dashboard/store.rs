//! Record store: the current snapshot, replaced as a whole.

use std::sync::Arc;

use crate::models::Snapshot;

/// Holds the current snapshot behind an `Arc` so readers can keep a
/// consistent capture while a newer one is installed.
#[derive(Debug, Clone)]
pub struct RecordStore {
    current: Arc<Snapshot>,
}

impl RecordStore {
    #[must_use]
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: Arc::new(initial),
        }
    }

    /// Borrow the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.current
    }

    /// Shared handle to the current snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// Install a new snapshot, returning the one it replaced.
    pub fn replace(&mut self, next: Snapshot) -> Arc<Snapshot> {
        std::mem::replace(&mut self.current, Arc::new(next))
    }
}
