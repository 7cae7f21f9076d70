//! Frame loop
//!
//! Runs on its own OS thread and is the only writer of world state:
//!
//! 1. pull the next frame from the [`DetectionSource`]
//! 2. [`Tracker::process_frame`] and publish the snapshot
//! 3. until the frame's time budget is used up, apply queued admin commands
//!    (each one republishes)
//!
//! Admin commands therefore always land between frames. Once the source is
//! exhausted the loop keeps serving admin commands until cancelled.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use swarm_core::{AdminCommand, Tracker};
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::publisher::SnapshotHandle;
use crate::source::DetectionSource;

/// Idle wait when a live source has nothing to pace against
const IDLE_INTERVAL: Duration = Duration::from_millis(50);

/// Counters reported when the loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub skipped: u64,
    pub admin_commands: u64,
}

pub struct FrameLoop {
    tracker: Tracker,
    source: Box<dyn DetectionSource>,
    snapshots: SnapshotHandle,
    admin: Receiver<AdminCommand>,
    cancel: CancellationToken,
    interval: Duration,
    stats: LoopStats,
}

impl FrameLoop {
    /// `interval` is the per-frame budget; zero processes frames as fast as
    /// the source delivers them.
    pub fn new(
        tracker: Tracker,
        source: Box<dyn DetectionSource>,
        admin: Receiver<AdminCommand>,
        ctx: &AppContext,
        interval: Duration,
    ) -> Self {
        Self {
            tracker,
            source,
            snapshots: ctx.snapshots.clone(),
            admin,
            cancel: ctx.cancel.clone(),
            interval,
            stats: LoopStats::default(),
        }
    }

    pub fn spawn(self) -> std::io::Result<JoinHandle<LoopStats>> {
        std::thread::Builder::new().name("frame-loop".into()).spawn(move || self.run())
    }

    pub fn run(mut self) -> LoopStats {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "frame loop started");
        let mut exhausted = false;

        while !self.cancel.is_cancelled() {
            let started = Instant::now();
            if !exhausted {
                exhausted = !self.step();
            }
            let budget = if exhausted { self.interval.max(IDLE_INTERVAL) } else { self.interval };
            self.drain_admin(started + budget);
        }

        tracing::info!(
            frames = self.stats.frames,
            skipped = self.stats.skipped,
            admin_commands = self.stats.admin_commands,
            "frame loop stopped"
        );
        self.stats
    }

    /// One frame. False once the source has no more frames.
    fn step(&mut self) -> bool {
        match self.source.next_frame() {
            Ok(Some(detections)) => {
                let summary = self.tracker.process_frame(&detections, Instant::now());
                if summary.calibrated_now {
                    tracing::info!(frame = summary.frame, "arena calibrated, serving positions");
                }
                self.snapshots.publish(self.tracker.snapshot());
                self.stats.frames += 1;
                true
            }
            Ok(None) => {
                tracing::info!(frames = self.stats.frames, "detection source exhausted");
                false
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "frame skipped");
                self.stats.skipped += 1;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "detection source failed, no further frames");
                self.stats.skipped += 1;
                false
            }
        }
    }

    fn drain_admin(&mut self, deadline: Instant) {
        loop {
            match self.admin.recv_deadline(deadline) {
                Ok(command) => {
                    self.tracker.apply(command, Instant::now());
                    self.snapshots.publish(self.tracker.snapshot());
                    self.stats.admin_commands += 1;
                }
                Err(RecvTimeoutError::Timeout) => return,
                Err(RecvTimeoutError::Disconnected) => {
                    std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    return;
                }
            }
        }
    }
}
