//! Match countdown
//!
//! Remaining time is derived from `Instant`s passed in by the caller, never
//! from tick counts, so a slow frame does not slow the clock.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerStatus {
    Stopped,
    Started,
    Paused,
    Complete,
}

#[derive(Debug, Clone)]
pub struct GameTimer {
    limit: Duration,
    /// Time available when the current run segment began
    budget: Duration,
    remaining: Duration,
    segment_start: Option<Instant>,
    status: TimerStatus,
}

impl GameTimer {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            budget: limit,
            remaining: limit,
            segment_start: None,
            status: TimerStatus::Stopped,
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Whole seconds left, truncated
    pub fn remaining_secs(&self) -> u64 {
        self.remaining.as_secs()
    }

    pub fn start(&mut self, now: Instant) {
        self.budget = self.limit;
        self.remaining = self.limit;
        self.segment_start = Some(now);
        self.status = TimerStatus::Started;
    }

    pub fn pause(&mut self, now: Instant) {
        if self.status != TimerStatus::Started {
            return;
        }
        self.remaining = self.left_at(now);
        self.status = TimerStatus::Paused;
    }

    pub fn resume(&mut self, now: Instant) {
        if self.status != TimerStatus::Paused {
            return;
        }
        self.budget = self.remaining;
        self.segment_start = Some(now);
        self.status = TimerStatus::Started;
    }

    /// STOPPED starts, STARTED pauses, PAUSED resumes, COMPLETE stays put
    pub fn toggle_pause(&mut self, now: Instant) {
        match self.status {
            TimerStatus::Stopped => self.start(now),
            TimerStatus::Started => self.pause(now),
            TimerStatus::Paused => self.resume(now),
            TimerStatus::Complete => {}
        }
    }

    /// Advance a running timer to `now`
    pub fn update(&mut self, now: Instant) {
        if self.status != TimerStatus::Started {
            return;
        }
        self.remaining = self.left_at(now);
        if self.remaining.is_zero() {
            self.status = TimerStatus::Complete;
            tracing::info!("match timer complete");
        }
    }

    fn left_at(&self, now: Instant) -> Duration {
        let elapsed = self
            .segment_start
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();
        self.budget.saturating_sub(elapsed)
    }
}
