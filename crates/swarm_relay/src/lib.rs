//! # swarm_relay - Frame loop and sensor relay for the swarm arena
//!
//! Runs the [`swarm_core::Tracker`] on a dedicated frame-loop thread fed by a
//! [`source::DetectionSource`], and serves the latest world snapshot to
//! robots over newline-delimited JSON on TCP.
//!
//! ```text
//!  detector ──► frame loop (thread) ──publish──► SnapshotHandle ◄──load── client tasks (tokio)
//!                    ▲
//!  admin console ────┘ (crossbeam channel, applied between frames)
//! ```

pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod frame_loop;
pub mod protocol;
pub mod publisher;
pub mod server;
pub mod source;

use std::time::Duration;

use swarm_core::Tracker;
use tokio::net::TcpListener;

pub use config::RelayConfig;
pub use context::AppContext;
pub use error::{RelayError, Result};
pub use frame_loop::{FrameLoop, LoopStats};
pub use publisher::SnapshotHandle;

use crate::source::{DetectionSource, ReplaySource, StreamSource};

/// Start the frame loop and relay and block until Ctrl-C
///
/// With a replay file the console reads admin commands from stdin; without
/// one stdin carries the detector's frames and the console is disabled.
pub async fn run(config: RelayConfig) -> Result<()> {
    let replaying = config.replay.is_some();
    let source: Box<dyn DetectionSource> = match &config.replay {
        Some(path) => Box::new(ReplaySource::open(path, config.loop_playback)?),
        None => {
            tracing::info!("reading detection frames from stdin");
            Box::new(StreamSource::new(std::io::BufReader::new(std::io::stdin())))
        }
    };

    let listener = TcpListener::bind(config.bind).await?;

    let tracker = Tracker::new(config.tracker.clone());
    let (ctx, admin) = AppContext::new(tracker.snapshot());
    let interval = if replaying { config.frame_interval() } else { Duration::ZERO };
    let frame_loop = FrameLoop::new(tracker, source, admin, &ctx, interval).spawn()?;

    if replaying {
        console::spawn_stdin_console(ctx.clone())?;
    }

    let signal_ctx = ctx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("interrupt received, shutting down");
                signal_ctx.shutdown();
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for interrupt"),
        }
    });

    server::serve(listener, ctx.snapshots.clone(), ctx.cancel.clone()).await?;

    // A live stdin source may be blocked in a read; only a replay loop is joined
    if replaying {
        let stats = tokio::task::spawn_blocking(move || frame_loop.join())
            .await
            .map_err(|e| RelayError::Source(format!("frame loop join failed: {e}")))?
            .map_err(|_| RelayError::Source("frame loop panicked".into()))?;
        tracing::info!(frames = stats.frames, "shutdown complete");
    }
    Ok(())
}
