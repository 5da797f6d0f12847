//! The snapshot store: the pipeline's only mutable shared state.
//!
//! Readers clone an `Arc` under a short read lock, so they observe either
//! the fully-previous or the fully-new snapshot, never a mixture, and a
//! rebuild in progress never blocks them. Writers are serialized by a
//! separate gate acquired with `try_lock`, which is what enforces the
//! at-most-one-rebuild-in-flight rule without ever touching the read path.

use std::sync::{Arc, RwLock};

use core_types::Snapshot;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct SnapshotStore {
    latest: RwLock<Option<Arc<Snapshot>>>,
    rebuild_gate: Mutex<()>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest completed snapshot, if any rebuild has finished yet.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        match self.latest.read() {
            Ok(guard) => guard.clone(),
            // A poisoned lock means a writer panicked mid-swap; the stored
            // Arc is still either the old or the new snapshot, so read it.
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Publishes a new snapshot as a single atomic swap and returns it.
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = match self.latest.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Claims the exclusive right to rebuild. Returns `None` while another
    /// rebuild holds the gate; the caller maps that to a busy status.
    pub fn begin_rebuild(&self) -> Option<MutexGuard<'_, ()>> {
        self.rebuild_gate.try_lock().ok()
    }
}
