//! Geometry primitives
//!
//! 2D points live in `nalgebra::Vector2<f64>`. Angles are degrees throughout,
//! matching what robots receive over the relay.
//!
//! ## Bearing convention
//! - absolute bearing: `atan2(dy, dx)` from observer to target
//! - relative bearing: absolute bearing minus the observer's heading
//! - normalized into `(-180, 180]`

use nalgebra::Vector2;

/// Point or displacement in the plane (pixels or metres depending on context)
pub type Point = Vector2<f64>;

/// Build a point from raw coordinates
#[inline]
pub fn point(x: f64, y: f64) -> Point {
    Vector2::new(x, y)
}

/// Normalize an angle in degrees into `(-180, 180]`
pub fn normalize_bearing(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: &Point, b: &Point) -> f64 {
    (b - a).norm()
}

/// Direction from `from` to `to` in degrees, measured from the +x axis
#[inline]
pub fn absolute_bearing(from: &Point, to: &Point) -> f64 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

/// Bearing of `to` as seen by an observer at `from` facing `heading_deg`
///
/// Order matters: absolute bearing first, then subtract heading, then normalize.
pub fn relative_bearing(from: &Point, heading_deg: f64, to: &Point) -> f64 {
    let absolute = absolute_bearing(from, to);
    normalize_bearing(absolute - heading_deg)
}

/// Round to two decimals, the precision used on the wire
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x1: x, y1: y, x2: x + width, y2: y + height }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn centre(&self) -> Point {
        point(self.x1 + self.width() / 2.0, self.y1 + self.height() / 2.0)
    }

    /// True when a circle lies strictly inside the rectangle
    pub fn contains_circle(&self, centre: &Point, radius: f64) -> bool {
        centre.x - radius > self.x1
            && centre.x + radius < self.x2
            && centre.y - radius > self.y1
            && centre.y + radius < self.y2
    }

    /// Inclusive containment test on the x axis only
    pub fn spans_x(&self, x: f64) -> bool {
        self.x1 <= x && x <= self.x2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bearing_edges() {
        assert_eq!(normalize_bearing(180.0), 180.0);
        assert_eq!(normalize_bearing(-180.0), 180.0);
        assert_eq!(normalize_bearing(0.0), 0.0);
        assert!((normalize_bearing(181.0) - (-179.0)).abs() < 1e-9);
        assert!((normalize_bearing(-181.0) - 179.0).abs() < 1e-9);
        assert!((normalize_bearing(720.0 + 45.0) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_relative_bearing_subtracts_heading() {
        let a = point(0.0, 0.0);
        let b = point(0.0, 1.0);
        // Target straight "down" the +y axis, observer facing +x
        assert!((relative_bearing(&a, 0.0, &b) - 90.0).abs() < 1e-9);
        // Facing the target
        assert!(relative_bearing(&a, 90.0, &b).abs() < 1e-9);
        // Facing away: 90 - (-90) = 180
        assert!((relative_bearing(&a, -90.0, &b) - 180.0).abs() < 1e-9);
        // 90 - 170 = -80
        assert!((relative_bearing(&a, 170.0, &b) + 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_contains_circle_is_strict() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(r.contains_circle(&point(50.0, 50.0), 30.0));
        assert!(!r.contains_circle(&point(30.0, 50.0), 30.0));
        assert!(!r.contains_circle(&point(90.0, 50.0), 30.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(2.0), 2.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_normalize_in_half_open_range(x in -1.0e6f64..1.0e6f64) {
                let n = normalize_bearing(x);
                prop_assert!(n > -180.0 && n <= 180.0);
            }

            #[test]
            fn prop_normalize_periodic(x in -3600.0f64..3600.0f64, k in -20i32..20i32) {
                let a = normalize_bearing(x);
                let b = normalize_bearing(x + 360.0 * k as f64);
                // Compare on the circle so that values either side of the seam agree
                let diff = normalize_bearing(a - b).abs();
                prop_assert!(diff < 1e-6 || (360.0 - diff) < 1e-6);
            }

            #[test]
            fn prop_distance_symmetric(ax in -10.0f64..10.0, ay in -10.0f64..10.0,
                                       bx in -10.0f64..10.0, by in -10.0f64..10.0) {
                let a = point(ax, ay);
                let b = point(bx, by);
                prop_assert!((distance(&a, &b) - distance(&b, &a)).abs() < 1e-12);
            }
        }
    }
}
