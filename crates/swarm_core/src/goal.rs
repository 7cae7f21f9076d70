//! Goals
//!
//! Each goal is a pixel-space rectangle defended by one team. The score is
//! edge-triggered: a goal counts once when the ball's bounding circle enters
//! the rectangle and is re-armed only after the ball has left it again.

use serde::{Deserialize, Serialize};

use crate::calibration::ArenaBounds;
use crate::config::LayoutConfig;
use crate::entity::Ball;
use crate::geometry::{Point, Rect};
use crate::roles::Team;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Team defending this goal
    pub owner: Team,
    pub rect: Rect,
    /// Number of times the ball has entered
    pub count: u32,
    ball_inside: bool,
}

impl Goal {
    pub fn new(owner: Team, rect: Rect) -> Self {
        Self { owner, rect, count: 0, ball_inside: false }
    }

    /// Goal centre in pixels
    pub fn centre(&self) -> Point {
        self.rect.centre()
    }

    /// Goal centre in metres
    pub fn centre_m(&self, bounds: &ArenaBounds) -> Point {
        bounds.to_metres(&self.centre())
    }

    pub fn ball_inside(&self) -> bool {
        self.ball_inside
    }

    /// Update the containment latch; returns true on a counted entry
    ///
    /// An unseen ball leaves the latch untouched so an occluded ball sitting
    /// in the goal is not counted twice. Entries while `scoring` is false
    /// still move the latch but are not counted.
    pub fn observe(&mut self, ball: Option<&Ball>, radius_px: f64, scoring: bool) -> bool {
        let Some(ball) = ball else {
            return false;
        };

        let inside = self.rect.contains_circle(&ball.pixel, radius_px);
        let entered = inside && !self.ball_inside;
        self.ball_inside = inside;

        if entered && scoring {
            self.count += 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.ball_inside = false;
    }
}

/// Both goals of the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPair {
    /// Defended by RED, at the left edge
    pub red: Goal,
    /// Defended by BLUE, at the right edge
    pub blue: Goal,
}

impl GoalPair {
    /// Goals scored by `team`: entries into the other team's goal
    pub fn score_for(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.blue.count,
            Team::Blue => self.red.count,
            Team::Unassigned => 0,
        }
    }

    /// Manual correction of a team's score, never below zero
    pub fn adjust(&mut self, team: Team, delta: i32) {
        let goal = match team {
            Team::Red => &mut self.blue,
            Team::Blue => &mut self.red,
            Team::Unassigned => return,
        };
        goal.count = goal.count.saturating_add_signed(delta);
    }

    pub fn reset(&mut self) {
        self.red.reset();
        self.blue.reset();
    }
}

/// Red goal at the left edge, blue goal at the right edge, centred vertically
pub fn define_goals(bounds: &ArenaBounds, layout: &LayoutConfig) -> GoalPair {
    let arena = bounds.pixels;
    let width = arena.width() / layout.goal_width_divisor;
    let height = arena.height() * layout.goal_height_fraction;
    let y = arena.y1 + (arena.height() - height) / 2.0;

    GoalPair {
        red: Goal::new(Team::Red, Rect::new(arena.x1, y, width, height)),
        blue: Goal::new(Team::Blue, Rect::new(arena.x2 - width, y, width, height)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;

    fn ball_at(x: f64, y: f64) -> Ball {
        Ball { pixel: point(x, y), position: point(x / 100.0, y / 100.0) }
    }

    fn goal() -> Goal {
        Goal::new(Team::Red, Rect::new(0.0, 100.0, 200.0, 200.0))
    }

    #[test]
    fn test_define_goals() {
        let bounds =
            ArenaBounds { pixels: Rect::new(0.0, 0.0, 1400.0, 800.0), scale_factor: 100.0 };
        let GoalPair { red, blue } = define_goals(&bounds, &LayoutConfig::default());
        assert_eq!(red.rect, Rect::new(0.0, 200.0, 200.0, 400.0));
        assert_eq!(blue.rect, Rect::new(1200.0, 200.0, 200.0, 400.0));
        assert_eq!(red.centre(), point(100.0, 400.0));
        assert_eq!(blue.centre_m(&bounds), point(13.0, 4.0));
    }

    #[test]
    fn test_counts_once_per_entry() {
        let mut g = goal();
        let inside = ball_at(100.0, 200.0);
        let outside = ball_at(500.0, 200.0);

        assert!(g.observe(Some(&inside), 30.0, true));
        for _ in 0..10 {
            assert!(!g.observe(Some(&inside), 30.0, true));
        }
        assert_eq!(g.count, 1);

        g.observe(Some(&outside), 30.0, true);
        assert!(g.observe(Some(&inside), 30.0, true));
        assert_eq!(g.count, 2);
    }

    #[test]
    fn test_partial_overlap_is_not_a_goal() {
        let mut g = goal();
        assert!(!g.observe(Some(&ball_at(190.0, 200.0)), 30.0, true));
        assert_eq!(g.count, 0);
    }

    #[test]
    fn test_unseen_ball_keeps_latch() {
        let mut g = goal();
        g.observe(Some(&ball_at(100.0, 200.0)), 30.0, true);
        assert!(!g.observe(None, 30.0, true));
        assert!(g.ball_inside());
        assert!(!g.observe(Some(&ball_at(100.0, 200.0)), 30.0, true));
        assert_eq!(g.count, 1);
    }

    #[test]
    fn test_scores_credit_the_attacking_team() {
        let bounds =
            ArenaBounds { pixels: Rect::new(0.0, 0.0, 1400.0, 800.0), scale_factor: 100.0 };
        let mut goals = define_goals(&bounds, &LayoutConfig::default());
        let in_red_goal = ball_at(100.0, 400.0);
        goals.red.observe(Some(&in_red_goal), 30.0, true);
        assert_eq!(goals.score_for(Team::Blue), 1);
        assert_eq!(goals.score_for(Team::Red), 0);

        goals.adjust(Team::Red, 2);
        goals.adjust(Team::Blue, -5);
        assert_eq!(goals.score_for(Team::Red), 2);
        assert_eq!(goals.score_for(Team::Blue), 0);
    }

    #[test]
    fn test_no_score_while_gated() {
        let mut g = goal();
        assert!(!g.observe(Some(&ball_at(100.0, 200.0)), 30.0, false));
        // Still inside when scoring resumes: no late goal
        assert!(!g.observe(Some(&ball_at(100.0, 200.0)), 30.0, true));
        assert_eq!(g.count, 0);
    }
}
