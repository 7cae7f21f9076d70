//! # swarm_core - Arena tracking and virtual sensing for robot swarms
//!
//! Turns per-frame fiducial tag detections from an overhead camera into a
//! world model of a robot arena, and derives per-robot relative sensor
//! readings from it.
//!
//! ## Features
//! - One-shot arena calibration from two corner tags
//! - Zones, teams and roles for a robot football game
//! - Edge-triggered goal counting and a pausable match timer
//! - Seeded foraging tasks
//! - Immutable per-frame snapshots for concurrent readers
//!
//! ```rust
//! use std::time::Instant;
//! use swarm_core::{Detection, Tracker, TrackerConfig};
//!
//! let mut tracker = Tracker::new(TrackerConfig::default());
//! let frame = vec![
//!     Detection::square(0, 0.0, 0.0, 10.0, 0.0),
//!     Detection::square(0, 1400.0, 800.0, 10.0, 0.0),
//!     Detection::square(7, 300.0, 400.0, 10.0, 0.0),
//! ];
//! tracker.process_frame(&frame, Instant::now());
//! assert_eq!(tracker.snapshot().ids(), vec![7]);
//! ```

// Struct initialization pattern used intentionally in tests
#![allow(clippy::field_reassign_with_default)]

pub mod admin;
pub mod calibration;
pub mod config;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod goal;
pub mod roles;
pub mod sensors;
pub mod snapshot;
pub mod tag;
pub mod task;
pub mod timer;
pub mod tracker;
pub mod zone;

pub use admin::AdminCommand;
pub use calibration::ArenaBounds;
pub use config::{MembershipPolicy, TrackerConfig};
pub use error::{Result, TrackerError};
pub use geometry::{normalize_bearing, relative_bearing, Point};
pub use roles::{Role, Team};
pub use sensors::{RobotSensors, SensorReading};
pub use snapshot::{RobotState, WorldSnapshot};
pub use tag::{Detection, Tag, TagId};
pub use timer::TimerStatus;
pub use tracker::{FrameSummary, Tracker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
