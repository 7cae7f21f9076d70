//! Foraging tasks
//!
//! Tasks are points in the arena that need a number of robots ("workers")
//! gathered around them. Lifecycle per frame:
//! 1. complete tasks whose worker requirement is met
//! 2. expire tasks older than the configured lifetime
//! 3. spawn new tasks until the target count is active again
//!
//! Spawning uses a seeded ChaCha RNG so a replayed session spawns the same
//! tasks in the same places.

use std::time::{Duration, Instant};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::TaskConfig;
use crate::entity::Robot;
use crate::geometry::{distance, point, Point, Rect};

pub type TaskId = u32;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: TaskId,
    /// Position in metres
    pub position: Point,
    /// Robots required to complete the task
    pub workers: u32,
    #[serde(skip)]
    pub spawned_at: Instant,
}

impl Task {
    /// Robots currently within `radius_m` of the task
    pub fn workers_present(&self, robots: &[Robot], radius_m: f64) -> u32 {
        robots.iter().filter(|r| distance(&r.position, &self.position) <= radius_m).count() as u32
    }
}

/// What happened to the task set during one update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskEvents {
    pub completed: Vec<TaskId>,
    pub expired: Vec<TaskId>,
    pub spawned: Vec<TaskId>,
}

#[derive(Debug, Clone)]
pub struct TaskBoard {
    config: TaskConfig,
    rng: ChaCha8Rng,
    next_id: TaskId,
    tasks: Vec<Task>,
    completed_total: u32,
}

impl TaskBoard {
    pub fn new(config: TaskConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng, next_id: 1, tasks: Vec::new(), completed_total: 0 }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn completed_total(&self) -> u32 {
        self.completed_total
    }

    /// Run one lifecycle step. `arena_m` is the calibrated arena in metres.
    pub fn update(&mut self, robots: &[Robot], arena_m: &Rect, now: Instant) -> TaskEvents {
        let mut events = TaskEvents::default();
        if !self.config.enabled {
            return events;
        }

        let radius = self.config.task_radius_m;
        let lifetime = Duration::from_secs(self.config.lifetime_secs);

        self.tasks.retain(|task| {
            if task.workers_present(robots, radius) >= task.workers {
                events.completed.push(task.id);
                false
            } else if now.saturating_duration_since(task.spawned_at) >= lifetime {
                events.expired.push(task.id);
                false
            } else {
                true
            }
        });
        self.completed_total += events.completed.len() as u32;

        while self.tasks.len() < self.config.target_count {
            let task = self.spawn(arena_m, now);
            events.spawned.push(task.id);
            self.tasks.push(task);
        }

        if !events.completed.is_empty() || !events.expired.is_empty() {
            tracing::debug!(
                completed = ?events.completed,
                expired = ?events.expired,
                spawned = ?events.spawned,
                "task lifecycle"
            );
        }
        events
    }

    fn spawn(&mut self, arena_m: &Rect, now: Instant) -> Task {
        // Keep the task's working circle inside the arena when there is room
        let inset =
            self.config.task_radius_m.min(arena_m.width() / 2.0).min(arena_m.height() / 2.0);
        let x = sample(&mut self.rng, arena_m.x1 + inset, arena_m.x2 - inset);
        let y = sample(&mut self.rng, arena_m.y1 + inset, arena_m.y2 - inset);
        let workers = self.rng.gen_range(1..=self.config.max_workers.max(1));

        let id = self.next_id;
        self.next_id += 1;
        Task { id, position: point(x, y), workers, spawned_at: now }
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

fn sample(rng: &mut ChaCha8Rng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}
