//! Published world state
//!
//! A [`WorldSnapshot`] is built once at the end of every frame (and after
//! every admin command) and never mutated afterwards. Readers hold an
//! `Arc<WorldSnapshot>` so one frame's data stays consistent for the whole
//! reply even while the next frame is being processed.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::calibration::ArenaBounds;
use crate::entity::{Ball, Robot};
use crate::roles::{Role, Team};
use crate::sensors::RobotSensors;
use crate::tag::TagId;
use crate::task::Task;
use crate::timer::TimerStatus;
use crate::zone::Zone;

/// One robot with its assignment and this frame's sensor readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotState {
    #[serde(flatten)]
    pub robot: Robot,
    pub team: Team,
    pub role: Role,
    pub sensors: RobotSensors,
}

/// Goals scored by each team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub red: u32,
    pub blue: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimerState {
    pub status: TimerStatus,
    pub remaining_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    /// Frames processed so far
    pub frame: u64,
    pub calibrated: bool,
    pub bounds: Option<ArenaBounds>,
    pub robots: BTreeMap<TagId, RobotState>,
    pub ball: Option<Ball>,
    pub tasks: Vec<Task>,
    pub scores: Scores,
    pub timer: TimerState,
    pub zones: Vec<Zone>,
}

impl WorldSnapshot {
    /// State before any frame: uncalibrated, nothing tracked
    pub fn empty(game_time_secs: u64) -> Self {
        Self {
            frame: 0,
            calibrated: false,
            bounds: None,
            robots: BTreeMap::new(),
            ball: None,
            tasks: Vec::new(),
            scores: Scores::default(),
            timer: TimerState { status: TimerStatus::Stopped, remaining_secs: game_time_secs },
            zones: Vec::new(),
        }
    }

    /// Ids of the robots seen this frame, ascending
    pub fn ids(&self) -> Vec<TagId> {
        self.robots.keys().copied().collect()
    }

    pub fn robot(&self, id: TagId) -> Option<&RobotState> {
        self.robots.get(&id)
    }

    /// Robots currently outside the zone they were assigned to
    pub fn rule_breakers(&self) -> Vec<TagId> {
        let mut ids: Vec<TagId> =
            self.zones.iter().flat_map(|z| z.rule_breakers.iter().copied()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
