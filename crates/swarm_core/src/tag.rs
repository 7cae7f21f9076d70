//! Tag model
//!
//! Converts one raw fiducial detection (id + four corners in winding order)
//! into an oriented pose in pixel space. Corners 0 and 1 are the leading
//! edge of the marker; their midpoint is the tag's "front".

use serde::{Deserialize, Serialize};

use crate::geometry::{normalize_bearing, point, Point};

/// Marker identifier as reported by the detector
pub type TagId = u32;

/// Raw detector output for one marker in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: TagId,
    /// Corners in pixel space, consistent winding order (leading edge first)
    pub corners: [[f64; 2]; 4],
}

impl Detection {
    pub fn new(id: TagId, corners: [[f64; 2]; 4]) -> Self {
        Self { id, corners }
    }

    /// Axis-aligned square detection centred on `(cx, cy)` facing `angle_deg`
    ///
    /// Handy for replay fixtures and tests.
    pub fn square(id: TagId, cx: f64, cy: f64, half: f64, angle_deg: f64) -> Self {
        let (s, c) = angle_deg.to_radians().sin_cos();
        // Local frame: +x points to the front edge
        let local = [(half, -half), (half, half), (-half, half), (-half, -half)];
        let mut corners = [[0.0; 2]; 4];
        for (slot, (lx, ly)) in corners.iter_mut().zip(local) {
            *slot = [cx + lx * c - ly * s, cy + lx * s + ly * c];
        }
        Self { id, corners }
    }
}

/// Oriented pose of a detected marker (pixel space)
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: TagId,
    pub corners: [Point; 4],
    pub centre: Point,
    pub front: Point,
    /// Facing angle in degrees, `atan2(front - centre)`, in `(-180, 180]`
    pub angle: f64,
}

impl Tag {
    pub fn new(id: TagId, corners: [Point; 4]) -> Self {
        let centre = (corners[0] + corners[1] + corners[2] + corners[3]) / 4.0;
        let front = (corners[0] + corners[1]) / 2.0;
        let forward = front - centre;
        let angle = normalize_bearing(forward.y.atan2(forward.x).to_degrees());

        Self { id, corners, centre, front, angle }
    }
}

impl From<&Detection> for Tag {
    fn from(detection: &Detection) -> Self {
        let corners = detection.corners.map(|[x, y]| point(x, y));
        Tag::new(detection.id, corners)
    }
}
