//! Relative sensor model
//!
//! Virtual sensor readings derived from tracked ground truth, computed fresh
//! every frame for every robot:
//!
//! | Reading | Target |
//! |---------|--------|
//! | `players` | every other robot (with its orientation) |
//! | `ball` | ball, when seen this frame |
//! | `their_goal` / `our_goal` | goal centres in metres |
//! | `tasks` | active tasks within sensing radius (with worker count) |
//! | `progress_through_zone` | 0.0 own end of zone .. 1.0 opponent end |
//!
//! Bearings are always `normalize(atan2(dy, dx) - heading)`.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::{Ball, Robot};
use crate::geometry::{distance, relative_bearing, Point};
use crate::roles::{Assignment, Role, Team};
use crate::tag::TagId;
use crate::task::{Task, TaskId};
use crate::zone::Zone;

/// Range and bearing from one robot to one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Metres
    pub range: f64,
    /// Degrees in `(-180, 180]`, relative to the observer's heading
    pub bearing: f64,
    /// Observed robot's own facing angle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<f64>,
    /// Worker requirement of an observed task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<u32>,
}

impl SensorReading {
    /// Plain range/bearing reading from `observer` to `target`
    pub fn between(observer: &Robot, target: &Point) -> Self {
        Self {
            range: distance(&observer.position, target),
            bearing: relative_bearing(&observer.position, observer.orientation, target),
            orientation: None,
            workers: None,
        }
    }
}

/// Another robot as seen by the observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerReading {
    pub team: Team,
    pub role: Role,
    pub reading: SensorReading,
}

/// Everything one robot senses in one frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotSensors {
    pub players: BTreeMap<TagId, PlayerReading>,
    pub ball: Option<SensorReading>,
    pub their_goal: Option<SensorReading>,
    pub our_goal: Option<SensorReading>,
    pub tasks: BTreeMap<TaskId, SensorReading>,
    pub progress_through_zone: f64,
}

/// Goal centres in metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmarks {
    pub red_goal: Point,
    pub blue_goal: Point,
}

impl Landmarks {
    /// (goal to attack, goal to defend) for a team
    pub fn for_team(&self, team: Team) -> (Point, Point) {
        if team.attacks_right() {
            (self.blue_goal, self.red_goal)
        } else {
            (self.red_goal, self.blue_goal)
        }
    }
}

/// Read-only view of one frame's world state
pub struct SensorContext<'a> {
    pub robots: &'a [Robot],
    pub roster: &'a HashMap<TagId, Assignment>,
    pub ball: Option<&'a Ball>,
    pub landmarks: Option<Landmarks>,
    pub tasks: &'a [Task],
    pub zones: &'a [Zone],
    pub sensor_range_m: f64,
}

impl SensorContext<'_> {
    fn assignment(&self, id: TagId) -> Assignment {
        self.roster.get(&id).copied().unwrap_or_default()
    }

    /// Readings for one robot
    pub fn sense(&self, robot: &Robot) -> RobotSensors {
        let me = self.assignment(robot.id);

        let players = self
            .robots
            .iter()
            .filter(|other| other.id != robot.id)
            .map(|other| {
                let them = self.assignment(other.id);
                let mut reading = SensorReading::between(robot, &other.position);
                reading.orientation = Some(other.orientation);
                (other.id, PlayerReading { team: them.team, role: them.role, reading })
            })
            .collect();

        // Unseen ball: no reading this frame
        let ball = self.ball.map(|b| SensorReading::between(robot, &b.position));

        let (their_goal, our_goal) = match self.landmarks {
            Some(l) => {
                let (attack, defend) = l.for_team(me.team);
                (
                    Some(SensorReading::between(robot, &attack)),
                    Some(SensorReading::between(robot, &defend)),
                )
            }
            None => (None, None),
        };

        let tasks = self
            .tasks
            .iter()
            .filter_map(|task| {
                let mut reading = SensorReading::between(robot, &task.position);
                if reading.range > self.sensor_range_m {
                    return None;
                }
                reading.workers = Some(task.workers);
                Some((task.id, reading))
            })
            .collect();

        RobotSensors {
            players,
            ball,
            their_goal,
            our_goal,
            tasks,
            progress_through_zone: self.progress(robot, me),
        }
    }

    /// Fraction through the robot's own zone, 1.0 = deepest towards the opponent
    fn progress(&self, robot: &Robot, me: Assignment) -> f64 {
        if me.team == Team::Unassigned {
            return 0.0;
        }
        let count = self.zones.len();
        self.zones
            .iter()
            .find(|zone| {
                zone.de_jure.contains(&robot.id)
                    && me.role == Role::for_zone(zone.index, count, me.team)
            })
            .map(|zone| {
                let along = zone.fraction_along(robot.pixel.x);
                if me.team.attacks_right() {
                    along
                } else {
                    1.0 - along
                }
            })
            .unwrap_or(0.0)
    }

    /// Readings for every robot, computed in parallel
    pub fn sense_all(&self) -> BTreeMap<TagId, RobotSensors> {
        let sensed: Vec<(TagId, RobotSensors)> =
            self.robots.par_iter().map(|robot| (robot.id, self.sense(robot))).collect();
        sensed.into_iter().collect()
    }
}
