//! Arena zones
//!
//! Zones are bands across the play (x) axis in pixel space.
//!
//! - **De jure** robots: assigned to the zone when membership is built
//!   (their position at that moment fell inside the band)
//! - **Rule breakers**: de jure robots currently outside the band,
//!   recomputed every frame

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::calibration::ArenaBounds;
use crate::config::LayoutConfig;
use crate::entity::Robot;
use crate::geometry::Rect;
use crate::roles::{Assignment, Role, Team};
use crate::tag::TagId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub index: usize,
    pub rect: Rect,
    pub de_jure: BTreeSet<TagId>,
    pub rule_breakers: BTreeSet<TagId>,
}

impl Zone {
    pub fn new(index: usize, rect: Rect) -> Self {
        Self { index, rect, de_jure: BTreeSet::new(), rule_breakers: BTreeSet::new() }
    }

    /// Fraction of `x` between the zone's lower and upper x bound
    pub fn fraction_along(&self, x: f64) -> f64 {
        let width = self.rect.width();
        if width <= 0.0 {
            return 0.0;
        }
        ((x - self.rect.x1) / width).clamp(0.0, 1.0)
    }

    /// Recompute which de jure members have strayed outside the band
    pub fn check_robots(&mut self, robots: &[Robot]) {
        self.rule_breakers = robots
            .iter()
            .filter(|r| self.de_jure.contains(&r.id) && !self.rect.spans_x(r.pixel.x))
            .map(|r| r.id)
            .collect();
    }
}

/// Split the arena into `zone_count` overlapping bands along x
pub fn define_zones(bounds: &ArenaBounds, layout: &LayoutConfig) -> Vec<Zone> {
    let arena = bounds.pixels;
    let count = layout.zone_count.max(1);
    let zone_width = arena.width() / count as f64;
    let overlap = layout.zone_overlap_px;

    (0..count)
        .map(|i| {
            let start = arena.x1 + zone_width * i as f64;
            let x1 = (start - overlap / 2.0).max(arena.x1);
            let x2 = (start + zone_width + overlap / 2.0).min(arena.x2);
            Zone::new(i, Rect { x1, y1: arena.y1, x2, y2: arena.y2 })
        })
        .collect()
}

/// Put robots in the first zone on RED and in the last on BLUE
///
/// Without `overwrite` only robots that have no team yet are touched.
pub fn assign_teams(
    zones: &[Zone],
    robots: &[Robot],
    roster: &mut HashMap<TagId, Assignment>,
    overwrite: bool,
) {
    let (Some(first), Some(last)) = (zones.first(), zones.last()) else {
        return;
    };
    if zones.len() < 2 {
        return;
    }

    for robot in robots {
        let entry = roster.entry(robot.id).or_default();
        if entry.team != Team::Unassigned && !overwrite {
            continue;
        }
        if first.rect.spans_x(robot.pixel.x) {
            entry.team = Team::Red;
        } else if last.rect.spans_x(robot.pixel.x) {
            entry.team = Team::Blue;
        }
    }
}

/// Rebuild de jure membership and the roles that follow from it
///
/// Zones are visited in order, so a robot standing in an overlap takes the
/// role of the later zone while belonging to both.
pub fn build_de_jure(
    zones: &mut [Zone],
    robots: &[Robot],
    roster: &mut HashMap<TagId, Assignment>,
) {
    let count = zones.len();
    for zone in zones.iter_mut() {
        zone.de_jure.clear();
        for robot in robots {
            if !zone.rect.spans_x(robot.pixel.x) {
                continue;
            }
            zone.de_jure.insert(robot.id);
            let entry = roster.entry(robot.id).or_default();
            entry.role = Role::for_zone(zone.index, count, entry.team);
        }
    }
}
