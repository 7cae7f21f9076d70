//! Relay process configuration
//!
//! Wraps the tracker configuration with the process-level settings: where the
//! relay listens, where detections come from and how fast frames are paced.
//!
//! ```yaml
//! bind: 0.0.0.0:6000
//! frame_rate: 30.0
//! replay: session.jsonl
//! loop_playback: true
//! tracker:
//!   calibration:
//!     reference_distance_m: 2.06
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use swarm_core::TrackerConfig;
use validator::Validate;

use crate::error::RelayError;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay listen address
    pub bind: SocketAddr,
    /// Frames per second when replaying recorded detections
    #[validate(range(min = 1.0, max = 240.0))]
    pub frame_rate: f64,
    /// Recorded detections (one JSON frame per line); stdin when unset
    pub replay: Option<PathBuf>,
    /// Start the replay over when it runs out
    pub loop_playback: bool,
    #[validate]
    pub tracker: TrackerConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 6000)),
            frame_rate: 30.0,
            replay: None,
            loop_playback: false,
            tracker: TrackerConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RelayError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, RelayError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Time budget of one replayed frame
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind.port(), 6000);
        assert_eq!(config.frame_interval(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn test_yaml_overrides_nested_tracker() {
        let yaml = "bind: 127.0.0.1:7000\ntracker:\n  game_time_secs: 120\n";
        let config = RelayConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.bind, "127.0.0.1:7000".parse().unwrap());
        assert_eq!(config.tracker.game_time_secs, 120);
        assert_eq!(config.frame_rate, 30.0);
    }

    #[test]
    fn test_nested_validation_runs() {
        let yaml = "tracker:\n  ball:\n    tag_id: 0\n";
        assert!(matches!(RelayConfig::from_yaml_str(yaml), Err(RelayError::InvalidConfig(_))));
        assert!(matches!(
            RelayConfig::from_yaml_str("frame_rate: 0.0\n"),
            Err(RelayError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_yaml_file_round_trip() {
        let mut config = RelayConfig::default();
        config.replay = Some(PathBuf::from("frames.jsonl"));
        config.loop_playback = true;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", config.to_yaml().unwrap()).unwrap();
        let loaded = RelayConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(loaded.replay, config.replay);
        assert!(loaded.loop_playback);
    }
}
