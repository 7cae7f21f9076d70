//! Relay wire protocol
//!
//! Newline-delimited JSON over one connection. Each request object may carry
//! any of these flags (only their presence matters):
//!
//! | Flag | Reply field |
//! |------|-------------|
//! | `check_awake` | `"awake": true` |
//! | `get_robots` | one entry per robot, keyed by stringified tag id |
//! | `get_ids` | `"ids": [sorted tag ids]` |
//!
//! One reply carries the union of every requested field. A request with no
//! recognised flag gets no reply. Floats are rounded to 2 decimals.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use swarm_core::geometry::round2;
use swarm_core::sensors::{PlayerReading, SensorReading};
use swarm_core::{RobotState, Role, TagId, Team, WorldSnapshot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Request {
    pub check_awake: bool,
    pub get_robots: bool,
    pub get_ids: bool,
}

impl Request {
    /// Malformed JSON is an error; any other JSON value is a request, with
    /// flags only when it is an object.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(line)?;
        let Some(fields) = value.as_object() else {
            return Ok(Self::default());
        };
        Ok(Self {
            check_awake: fields.contains_key("check_awake"),
            get_robots: fields.contains_key("get_robots"),
            get_ids: fields.contains_key("get_ids"),
        })
    }

    pub fn wants_reply(&self) -> bool {
        self.check_awake || self.get_robots || self.get_ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeBearing {
    pub range: f64,
    pub bearing: f64,
}

impl From<&SensorReading> for RangeBearing {
    fn from(reading: &SensorReading) -> Self {
        Self { range: round2(reading.range), bearing: round2(reading.bearing) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReport {
    pub team: Team,
    pub role: Role,
    pub range: f64,
    pub bearing: f64,
    pub orientation: f64,
}

impl From<&PlayerReading> for PlayerReport {
    fn from(player: &PlayerReading) -> Self {
        let r = &player.reading;
        Self {
            team: player.team,
            role: player.role,
            range: round2(r.range),
            bearing: round2(r.bearing),
            orientation: round2(r.orientation.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    pub range: f64,
    pub bearing: f64,
    pub workers: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotReport {
    pub orientation: f64,
    pub role: Role,
    pub team: Team,
    pub remaining_time: u64,
    pub progress_through_zone: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball: Option<RangeBearing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub their_goal: Option<RangeBearing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub our_goal: Option<RangeBearing>,
    pub players: BTreeMap<String, PlayerReport>,
    pub tasks: BTreeMap<String, TaskReport>,
}

impl RobotReport {
    pub fn new(state: &RobotState, remaining_time: u64) -> Self {
        let sensors = &state.sensors;
        Self {
            orientation: round2(state.robot.orientation),
            role: state.role,
            team: state.team,
            remaining_time,
            progress_through_zone: round2(sensors.progress_through_zone),
            ball: sensors.ball.as_ref().map(RangeBearing::from),
            their_goal: sensors.their_goal.as_ref().map(RangeBearing::from),
            our_goal: sensors.our_goal.as_ref().map(RangeBearing::from),
            players: sensors
                .players
                .iter()
                .map(|(id, player)| (id.to_string(), PlayerReport::from(player)))
                .collect(),
            tasks: sensors
                .tasks
                .iter()
                .map(|(id, reading)| {
                    let report = TaskReport {
                        range: round2(reading.range),
                        bearing: round2(reading.bearing),
                        workers: reading.workers.unwrap_or_default(),
                    };
                    (id.to_string(), report)
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awake: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<TagId>>,
    #[serde(flatten)]
    pub robots: BTreeMap<String, RobotReport>,
}

impl Reply {
    /// One JSON line, newline included
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Build the whole reply from one snapshot; `None` when nothing was asked for
pub fn build_reply(snapshot: &WorldSnapshot, request: &Request) -> Option<Reply> {
    if !request.wants_reply() {
        return None;
    }

    let mut reply = Reply::default();
    if request.check_awake {
        reply.awake = Some(true);
    }
    if request.get_ids {
        reply.ids = Some(snapshot.ids());
    }
    if request.get_robots {
        let remaining = snapshot.timer.remaining_secs;
        reply.robots = snapshot
            .robots
            .iter()
            .map(|(id, state)| (id.to_string(), RobotReport::new(state, remaining)))
            .collect();
    }
    Some(reply)
}
