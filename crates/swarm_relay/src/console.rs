//! Operator console: one admin command per stdin line
//!
//! Runs on its own detached thread; a blocking stdin read must not hold up
//! runtime shutdown.

use std::io::BufRead;
use std::thread::JoinHandle;

use swarm_core::AdminCommand;

use crate::context::AppContext;

/// Forward parsed commands to the frame loop until EOF or shutdown
pub fn run_console<R: BufRead>(input: R, ctx: &AppContext) {
    for line in input.lines() {
        if ctx.is_shutting_down() {
            return;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "admin console read failed");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<AdminCommand>() {
            Ok(command) => {
                if !ctx.send_admin(command) {
                    tracing::warn!(%command, "frame loop gone, command dropped");
                    return;
                }
            }
            Err(e) => tracing::warn!(
                error = %e,
                "expected one of: pause reset zones teams recalibrate red+ red- blue+ blue-"
            ),
        }
    }
    tracing::debug!("admin console closed");
}

pub fn spawn_stdin_console(ctx: AppContext) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("admin-console".into())
        .spawn(move || run_console(std::io::stdin().lock(), &ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use swarm_core::{Team, WorldSnapshot};

    #[test]
    fn test_forwards_known_commands() {
        let (ctx, commands) = AppContext::new(Arc::new(WorldSnapshot::empty(300)));
        run_console(Cursor::new("pause\nfly\n\nblue+\n"), &ctx);

        let received: Vec<AdminCommand> = commands.try_iter().collect();
        assert_eq!(
            received,
            vec![
                AdminCommand::TogglePause,
                AdminCommand::AdjustScore { team: Team::Blue, delta: 1 }
            ]
        );
    }

    #[test]
    fn test_stops_after_shutdown() {
        let (ctx, commands) = AppContext::new(Arc::new(WorldSnapshot::empty(300)));
        ctx.shutdown();
        run_console(Cursor::new("reset\n"), &ctx);
        assert!(commands.try_recv().is_err());
    }
}
