//! World model
//!
//! [`Tracker`] owns all mutable arena state. It is driven one frame at a time
//! by [`Tracker::process_frame`] and by operator commands through
//! [`Tracker::apply`]; after either it rebuilds an immutable
//! [`WorldSnapshot`] for readers.
//!
//! ## Frame pipeline
//! 1. Calibration (until the arena is calibrated)
//! 2. Ingest: robots and ball are cleared and rebuilt from this frame's tags
//! 3. Zone membership (per [`MembershipPolicy`]) and rule breakers
//! 4. Timer, goals, tasks
//! 5. Sensors for every robot
//! 6. Snapshot
//!
//! Team and role survive the per-frame rebuild in a roster keyed by tag id.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::admin::AdminCommand;
use crate::calibration::{ArenaBounds, Calibration};
use crate::config::{MembershipPolicy, TrackerConfig};
use crate::entity::{Ball, Robot};
use crate::goal::{define_goals, GoalPair};
use crate::roles::{Assignment, Team};
use crate::sensors::{Landmarks, RobotSensors, SensorContext};
use crate::snapshot::{RobotState, Scores, TimerState, WorldSnapshot};
use crate::tag::{Detection, Tag, TagId};
use crate::task::{TaskBoard, TaskEvents};
use crate::timer::{GameTimer, TimerStatus};
use crate::zone::{assign_teams, build_de_jure, define_zones, Zone};

// ============================================================================
// Frame summary
// ============================================================================

/// What happened during one call to [`Tracker::process_frame`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSummary {
    pub frame: u64,
    pub detections: usize,
    /// Calibration completed during this frame
    pub calibrated_now: bool,
    pub robots: usize,
    pub ball_seen: bool,
    /// Teams credited with a goal this frame
    pub goals_for: Vec<Team>,
    pub tasks: TaskEvents,
}

// ============================================================================
// Tracker
// ============================================================================

pub struct Tracker {
    config: TrackerConfig,
    calibration: Calibration,
    zones: Vec<Zone>,
    goals: Option<GoalPair>,
    roster: HashMap<TagId, Assignment>,
    robots: Vec<Robot>,
    ball: Option<Ball>,
    sensors: BTreeMap<TagId, RobotSensors>,
    timer: GameTimer,
    tasks: TaskBoard,
    membership_pending: bool,
    frame: u64,
    latest: Arc<WorldSnapshot>,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            calibration: Calibration::new(&config.calibration),
            zones: Vec::new(),
            goals: None,
            roster: HashMap::new(),
            robots: Vec::new(),
            ball: None,
            sensors: BTreeMap::new(),
            timer: GameTimer::new(Duration::from_secs(config.game_time_secs)),
            tasks: TaskBoard::new(config.tasks.clone()),
            membership_pending: true,
            frame: 0,
            latest: Arc::new(WorldSnapshot::empty(config.game_time_secs)),
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_calibrated()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<WorldSnapshot> {
        Arc::clone(&self.latest)
    }

    /// Team and role currently recorded for a tag
    pub fn assignment(&self, id: TagId) -> Assignment {
        self.roster.get(&id).copied().unwrap_or_default()
    }

    /// Run the full pipeline for one frame of detections
    pub fn process_frame(&mut self, detections: &[Detection], now: Instant) -> FrameSummary {
        self.frame += 1;
        let tags: Vec<Tag> = detections.iter().map(Tag::from).collect();
        let mut summary = FrameSummary {
            frame: self.frame,
            detections: detections.len(),
            ..FrameSummary::default()
        };

        if !self.calibration.is_calibrated() {
            for tag in &tags {
                if let Some(bounds) = self.calibration.observe(tag) {
                    self.lay_out_arena(&bounds);
                    summary.calibrated_now = true;
                }
            }
        }

        self.robots.clear();
        self.ball = None;
        self.sensors.clear();
        self.timer.update(now);

        if let Some(bounds) = self.calibration.bounds().copied() {
            self.ingest(&tags, &bounds);
            self.update_membership();
            for zone in &mut self.zones {
                zone.check_robots(&self.robots);
            }
            summary.goals_for = self.score_goals();
            summary.tasks = self.tasks.update(&self.robots, &bounds.metres(), now);
            self.sensors = self.sense(&bounds);
        }

        summary.robots = self.robots.len();
        summary.ball_seen = self.ball.is_some();
        self.publish();

        tracing::debug!(
            frame = summary.frame,
            detections = summary.detections,
            robots = summary.robots,
            ball = summary.ball_seen,
            "frame processed"
        );
        summary
    }

    /// Apply an operator command and republish
    pub fn apply(&mut self, command: AdminCommand, now: Instant) {
        tracing::info!(%command, "admin command");
        match command {
            AdminCommand::TogglePause => self.timer.toggle_pause(now),
            AdminCommand::Reset => self.reset(),
            AdminCommand::RebuildZones => self.rebuild_membership(false),
            AdminCommand::AssignTeams => self.rebuild_membership(true),
            AdminCommand::AdjustScore { team, delta } => {
                if let Some(goals) = self.goals.as_mut() {
                    goals.adjust(team, delta);
                }
            }
            AdminCommand::Recalibrate => self.recalibrate(),
        }

        self.sensors = match self.calibration.bounds().copied() {
            Some(bounds) => self.sense(&bounds),
            None => BTreeMap::new(),
        };
        self.publish();
    }

    // ========================================================================
    // Pipeline stages
    // ========================================================================

    fn lay_out_arena(&mut self, bounds: &ArenaBounds) {
        self.zones = define_zones(bounds, &self.config.layout);
        self.goals = Some(define_goals(bounds, &self.config.layout));
        self.membership_pending = true;
    }

    fn ingest(&mut self, tags: &[Tag], bounds: &ArenaBounds) {
        for tag in tags {
            if tag.id == self.config.ball.tag_id {
                self.ball = Some(Ball::from_tag(tag, bounds));
            } else if self.config.is_reserved(tag.id) {
                continue;
            } else if self.robots.iter().any(|r| r.id == tag.id) {
                tracing::debug!(id = tag.id, "duplicate tag in frame ignored");
            } else {
                self.robots.push(Robot::from_tag(tag, bounds));
            }
        }
    }

    fn update_membership(&mut self) {
        let due = match self.config.membership {
            MembershipPolicy::EveryFrame => true,
            MembershipPolicy::OnCalibration => self.membership_pending && !self.robots.is_empty(),
        };
        if due {
            self.rebuild_membership(false);
        }
    }

    /// Teams (when enabled or forced), de jure membership and roles from the
    /// robots of the last frame
    fn rebuild_membership(&mut self, force_teams: bool) {
        if self.zones.is_empty() {
            return;
        }
        if force_teams || self.config.auto_assign_teams {
            assign_teams(&self.zones, &self.robots, &mut self.roster, force_teams);
        }
        build_de_jure(&mut self.zones, &self.robots, &mut self.roster);
        self.membership_pending = self.robots.is_empty();

        tracing::debug!(robots = self.robots.len(), "zone membership built");
    }

    fn score_goals(&mut self) -> Vec<Team> {
        let scoring = !matches!(self.timer.status(), TimerStatus::Paused | TimerStatus::Complete);
        let Some(goals) = self.goals.as_mut() else {
            return Vec::new();
        };

        let radius = self.config.ball.radius_px;
        let ball = self.ball.as_ref();
        let mut scored = Vec::new();
        if goals.red.observe(ball, radius, scoring) {
            scored.push(Team::Blue);
        }
        if goals.blue.observe(ball, radius, scoring) {
            scored.push(Team::Red);
        }

        for team in &scored {
            tracing::info!(
                team = team.as_str(),
                red = goals.score_for(Team::Red),
                blue = goals.score_for(Team::Blue),
                "goal"
            );
        }
        scored
    }

    fn sense(&self, bounds: &ArenaBounds) -> BTreeMap<TagId, RobotSensors> {
        let landmarks = self.goals.as_ref().map(|g| Landmarks {
            red_goal: g.red.centre_m(bounds),
            blue_goal: g.blue.centre_m(bounds),
        });
        SensorContext {
            robots: &self.robots,
            roster: &self.roster,
            ball: self.ball.as_ref(),
            landmarks,
            tasks: self.tasks.tasks(),
            zones: &self.zones,
            sensor_range_m: self.config.sensing.sensor_range_m,
        }
        .sense_all()
    }

    fn publish(&mut self) {
        let robots = self
            .robots
            .iter()
            .map(|robot| {
                let assignment = self.assignment(robot.id);
                let sensors = self.sensors.get(&robot.id).cloned().unwrap_or_default();
                let state = RobotState {
                    robot: robot.clone(),
                    team: assignment.team,
                    role: assignment.role,
                    sensors,
                };
                (robot.id, state)
            })
            .collect();

        let scores = self
            .goals
            .as_ref()
            .map(|g| Scores { red: g.score_for(Team::Red), blue: g.score_for(Team::Blue) })
            .unwrap_or_default();

        self.latest = Arc::new(WorldSnapshot {
            frame: self.frame,
            calibrated: self.calibration.is_calibrated(),
            bounds: self.calibration.bounds().copied(),
            robots,
            ball: self.ball.clone(),
            tasks: self.tasks.tasks().to_vec(),
            scores,
            timer: TimerState {
                status: self.timer.status(),
                remaining_secs: self.timer.remaining_secs(),
            },
            zones: self.zones.clone(),
        });
    }

    // ========================================================================
    // Admin helpers
    // ========================================================================

    fn reset(&mut self) {
        self.timer = GameTimer::new(Duration::from_secs(self.config.game_time_secs));
        if let Some(goals) = self.goals.as_mut() {
            goals.reset();
        }
        self.roster.clear();
        for zone in &mut self.zones {
            zone.de_jure.clear();
            zone.rule_breakers.clear();
        }
        self.robots.clear();
        self.ball = None;
        self.tasks.clear();
        self.membership_pending = true;
    }

    fn recalibrate(&mut self) {
        self.calibration.reset();
        self.zones.clear();
        self.goals = None;
        self.robots.clear();
        self.ball = None;
        self.tasks.clear();
        self.membership_pending = true;
    }
}
