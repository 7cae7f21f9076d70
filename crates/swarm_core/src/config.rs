//! Tracker configuration
//!
//! All tuning constants for calibration, arena layout, sensing and tasks live
//! here. Every struct has a `Default` matching the classroom arena setup, and
//! the whole tree can be loaded from YAML.
//!
//! ```rust
//! use swarm_core::config::TrackerConfig;
//!
//! let config = TrackerConfig::default();
//! assert_eq!(config.calibration.corner_tag_id, 0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::TrackerError;
use crate::tag::TagId;

/// Full tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_reserved_ids"))]
#[serde(default)]
pub struct TrackerConfig {
    #[validate]
    pub calibration: CalibrationConfig,
    #[validate]
    pub layout: LayoutConfig,
    #[validate]
    pub ball: BallConfig,
    #[validate]
    pub sensing: SensingConfig,
    #[validate]
    pub tasks: TaskConfig,
    /// Match length in seconds
    #[validate(range(min = 1))]
    pub game_time_secs: u64,
    /// When de jure zone membership is (re)built
    pub membership: MembershipPolicy,
    /// Put unassigned robots standing in the end zones onto RED / BLUE
    pub auto_assign_teams: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            calibration: CalibrationConfig::default(),
            layout: LayoutConfig::default(),
            ball: BallConfig::default(),
            sensing: SensingConfig::default(),
            tasks: TaskConfig::default(),
            game_time_secs: 5 * 60,
            membership: MembershipPolicy::OnCalibration,
            auto_assign_teams: true,
        }
    }
}

impl TrackerConfig {
    /// Tag ids that never become robots
    pub fn is_reserved(&self, id: TagId) -> bool {
        id == self.calibration.corner_tag_id || id == self.ball.tag_id
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TrackerError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }
}

fn validate_reserved_ids(config: &TrackerConfig) -> Result<(), ValidationError> {
    if config.calibration.corner_tag_id == config.ball.tag_id {
        return Err(ValidationError::new("corner_and_ball_tag_ids_must_differ"));
    }
    Ok(())
}

/// Reference tags used to fix the pixel-to-metre scale
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Reserved id printed on both corner tags
    pub corner_tag_id: TagId,
    /// Real distance between the two corner tags (metres)
    #[validate(range(min = 0.01))]
    pub reference_distance_m: f64,
    /// Shortest pixel diagonal accepted between the corner tags. Smaller boxes
    /// come from one tag jittering between frames.
    #[validate(range(min = 1.0))]
    pub min_diagonal_px: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self { corner_tag_id: 0, reference_distance_m: 2.06, min_diagonal_px: 50.0 }
    }
}

/// Derived arena layout (pixel space, sized from the calibrated bounding box)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of bands across the play (x) axis
    #[validate(range(min = 1, max = 16))]
    pub zone_count: usize,
    /// How far neighbouring zones overlap (pixels)
    #[validate(range(min = 0.0))]
    pub zone_overlap_px: f64,
    /// Goal width = arena width / divisor
    #[validate(range(min = 1.0))]
    pub goal_width_divisor: f64,
    /// Goal height as a fraction of arena height
    #[validate(range(min = 0.01, max = 1.0))]
    pub goal_height_fraction: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            zone_count: 3,
            zone_overlap_px: 150.0,
            goal_width_divisor: 7.0,
            goal_height_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BallConfig {
    pub tag_id: TagId,
    /// Bounding circle used for goal containment (pixels)
    #[validate(range(min = 0.0))]
    pub radius_px: f64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self { tag_id: 1, radius_px: 30.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SensingConfig {
    /// Radius within which a robot senses tasks (metres)
    #[validate(range(min = 0.0))]
    pub sensor_range_m: f64,
}

impl Default for SensingConfig {
    fn default() -> Self {
        Self { sensor_range_m: 0.3 }
    }
}

/// Task spawning and completion
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TaskConfig {
    pub enabled: bool,
    /// Keep at least this many tasks active
    #[validate(range(max = 64))]
    pub target_count: usize,
    /// A task expires this long after spawning
    #[validate(range(min = 1))]
    pub lifetime_secs: u64,
    /// Robots within this radius count as working on the task (metres)
    #[validate(range(min = 0.01))]
    pub task_radius_m: f64,
    /// Required workers are drawn from `1..=max_workers`
    #[validate(range(min = 1, max = 32))]
    pub max_workers: u32,
    /// Seed for spawn positions and worker counts
    pub seed: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_count: 3,
            lifetime_secs: 60,
            task_radius_m: 0.1,
            max_workers: 3,
            seed: 1,
        }
    }
}

/// When the de jure membership of each zone is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipPolicy {
    /// Once, on the first calibrated frame with robots in view, and again on
    /// explicit reset or rebuild
    OnCalibration,
    /// Rebuilt from current positions every frame
    EveryFrame,
}
