//! Snapshot handoff between the frame loop and relay connections
//!
//! The frame loop is the only writer. Publishing swaps in a new
//! `Arc<WorldSnapshot>` while holding the write lock for the swap alone;
//! readers clone the current `Arc` and never see a partially built frame.

use std::sync::Arc;

use parking_lot::RwLock;
use swarm_core::WorldSnapshot;

#[derive(Clone)]
pub struct SnapshotHandle {
    current: Arc<RwLock<Arc<WorldSnapshot>>>,
}

impl SnapshotHandle {
    pub fn new(initial: Arc<WorldSnapshot>) -> Self {
        Self { current: Arc::new(RwLock::new(initial)) }
    }

    pub fn publish(&self, snapshot: Arc<WorldSnapshot>) {
        // The old snapshot is dropped after the guard is released
        let _previous = std::mem::replace(&mut *self.current.write(), snapshot);
    }

    /// Latest published snapshot
    pub fn load(&self) -> Arc<WorldSnapshot> {
        Arc::clone(&self.current.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readers_keep_their_snapshot() {
        let handle = SnapshotHandle::new(Arc::new(WorldSnapshot::empty(300)));
        let before = handle.load();

        let mut next = WorldSnapshot::empty(300);
        next.frame = 7;
        handle.publish(Arc::new(next));

        assert_eq!(before.frame, 0);
        assert_eq!(handle.load().frame, 7);
        assert_eq!(handle.clone().load().frame, 7);
    }
}
