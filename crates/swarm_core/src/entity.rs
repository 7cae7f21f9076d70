//! Tracked entities
//!
//! Rebuilt from scratch every frame: an entity exists in a frame only if its
//! tag was detected in that frame.

use serde::{Deserialize, Serialize};

use crate::calibration::ArenaBounds;
use crate::geometry::Point;
use crate::tag::{Tag, TagId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub id: TagId,
    /// Tag centre in pixels (zones and goals are pixel-space)
    pub pixel: Point,
    /// Position in metres
    pub position: Point,
    /// Facing angle in degrees
    pub orientation: f64,
}

impl Robot {
    pub fn from_tag(tag: &Tag, bounds: &ArenaBounds) -> Self {
        Self {
            id: tag.id,
            pixel: tag.centre,
            position: bounds.to_metres(&tag.centre),
            orientation: tag.angle,
        }
    }

    pub fn at_pixel(id: TagId, pixel: Point, orientation: f64, scale_factor: f64) -> Self {
        Self { id, pixel, position: pixel / scale_factor, orientation }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pixel: Point,
    pub position: Point,
}

impl Ball {
    pub fn from_tag(tag: &Tag, bounds: &ArenaBounds) -> Self {
        Self { pixel: tag.centre, position: bounds.to_metres(&tag.centre) }
    }
}
