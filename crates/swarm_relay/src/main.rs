//! Swarm relay CLI
//!
//! ```bash
//! detector | swarm_relay serve                       # live frames on stdin
//! swarm_relay serve --replay session.jsonl --loop    # admin commands on stdin
//! swarm_relay config --config arena.yaml             # print effective config
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use swarm_relay::RelayConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swarm_relay", version)]
#[command(
    about = "Track arena robots from tag detections and relay their virtual sensors",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the frame loop and the relay server
    Serve(Overrides),

    /// Print the effective configuration as YAML and exit
    Config(Overrides),
}

#[derive(Args)]
struct Overrides {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Relay listen address
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Replay frames per second
    #[arg(long)]
    frame_rate: Option<f64>,

    /// Recorded detections, one JSON frame per line
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Restart the replay when it ends
    #[arg(long = "loop", default_value = "false")]
    loop_playback: bool,
}

impl Overrides {
    fn load(self) -> Result<RelayConfig> {
        let mut config = match &self.config {
            Some(path) => RelayConfig::from_yaml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RelayConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(rate) = self.frame_rate {
            config.frame_rate = rate;
        }
        if let Some(replay) = self.replay {
            config.replay = Some(replay);
        }
        if self.loop_playback {
            config.loop_playback = true;
        }
        validator::Validate::validate(&config).context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swarm_relay=info,swarm_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(overrides) => {
            let config = overrides.load()?;
            tracing::info!(bind = %config.bind, replay = ?config.replay, "starting swarm relay");
            swarm_relay::run(config).await.context("relay failed")?;
        }
        Commands::Config(overrides) => {
            let config = overrides.load()?;
            print!("{}", config.to_yaml()?);
        }
    }
    Ok(())
}
