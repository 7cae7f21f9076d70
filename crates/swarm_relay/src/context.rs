//! Process-wide handles, owned by the entry point and cloned into components

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use swarm_core::{AdminCommand, WorldSnapshot};
use tokio_util::sync::CancellationToken;

use crate::publisher::SnapshotHandle;

#[derive(Clone)]
pub struct AppContext {
    /// Cancelled once on shutdown; every loop polls or awaits it
    pub cancel: CancellationToken,
    pub snapshots: SnapshotHandle,
    admin: Sender<AdminCommand>,
}

impl AppContext {
    /// New context plus the admin receiver for the frame loop
    pub fn new(initial: Arc<WorldSnapshot>) -> (Self, Receiver<AdminCommand>) {
        let (admin, commands) = crossbeam_channel::unbounded();
        let ctx = Self {
            cancel: CancellationToken::new(),
            snapshots: SnapshotHandle::new(initial),
            admin,
        };
        (ctx, commands)
    }

    /// Queue a command for the frame loop. False once the loop is gone.
    pub fn send_admin(&self, command: AdminCommand) -> bool {
        self.admin.send(command).is_ok()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
