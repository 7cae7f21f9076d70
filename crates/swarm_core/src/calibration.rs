//! Arena calibration
//!
//! Two reserved corner tags placed at opposite corners of the arena fix the
//! pixel bounding box and the pixel-to-metre scale. Calibration is one-shot:
//! once `ArenaBounds` has been produced it never changes for the session
//! (an explicit admin recalibration starts over).

use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;
use crate::geometry::{point, Point, Rect};
use crate::tag::{Tag, TagId};

/// Calibrated arena frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    /// Bounding box of the corner tag centres (pixels)
    pub pixels: Rect,
    /// Pixels per metre
    pub scale_factor: f64,
}

impl ArenaBounds {
    /// Pixel coordinates to metres (same origin as the image)
    pub fn to_metres(&self, pixel: &Point) -> Point {
        *pixel / self.scale_factor
    }

    /// Half extents of the arena in metres
    pub fn centre_m(&self) -> Point {
        point(
            self.pixels.width() / 2.0 / self.scale_factor,
            self.pixels.height() / 2.0 / self.scale_factor,
        )
    }

    /// Arena rectangle in metres
    pub fn metres(&self) -> Rect {
        let s = self.scale_factor;
        Rect {
            x1: self.pixels.x1 / s,
            y1: self.pixels.y1 / s,
            x2: self.pixels.x2 / s,
            y2: self.pixels.y2 / s,
        }
    }
}

/// Running corner-tag accumulator
#[derive(Debug, Clone)]
pub struct Calibration {
    corner_tag_id: TagId,
    reference_distance_m: f64,
    min_diagonal_px: f64,
    corner_sightings: u32,
    bbox: Option<Rect>,
    bounds: Option<ArenaBounds>,
}

impl Calibration {
    pub fn new(config: &CalibrationConfig) -> Self {
        Self {
            corner_tag_id: config.corner_tag_id,
            reference_distance_m: config.reference_distance_m,
            min_diagonal_px: config.min_diagonal_px,
            corner_sightings: 0,
            bbox: None,
            bounds: None,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn bounds(&self) -> Option<&ArenaBounds> {
        self.bounds.as_ref()
    }

    pub fn corner_sightings(&self) -> u32 {
        self.corner_sightings
    }

    /// Feed one tag. Returns the bounds on the call that completes calibration.
    ///
    /// Non-corner tags and tags seen after calibration are ignored.
    pub fn observe(&mut self, tag: &Tag) -> Option<ArenaBounds> {
        if self.bounds.is_some() || tag.id != self.corner_tag_id {
            return None;
        }

        let c = tag.centre;
        let bbox = match self.bbox {
            None => Rect { x1: c.x, y1: c.y, x2: c.x, y2: c.y },
            Some(b) => Rect {
                x1: b.x1.min(c.x),
                y1: b.y1.min(c.y),
                x2: b.x2.max(c.x),
                y2: b.y2.max(c.y),
            },
        };
        self.bbox = Some(bbox);
        self.corner_sightings += 1;

        if self.corner_sightings < 2 {
            return None;
        }

        let diagonal_px = (point(bbox.x2, bbox.y2) - point(bbox.x1, bbox.y1)).norm();
        if diagonal_px < self.min_diagonal_px {
            // Same corner seen again; keep waiting for the opposite one
            tracing::debug!(
                sightings = self.corner_sightings,
                diagonal_px,
                "corner tags too close, still calibrating"
            );
            return None;
        }

        let bounds = ArenaBounds {
            pixels: bbox,
            scale_factor: diagonal_px / self.reference_distance_m,
        };
        tracing::info!(
            scale_factor = bounds.scale_factor,
            width_px = bbox.width(),
            height_px = bbox.height(),
            "arena calibrated"
        );
        self.bounds = Some(bounds);
        Some(bounds)
    }

    /// Forget everything and wait for corner tags again
    pub fn reset(&mut self) {
        self.corner_sightings = 0;
        self.bbox = None;
        self.bounds = None;
    }
}
