use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, BoundingBox};
use crate::error::Error;

/// One candidate box from a single frame, in source-image pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    #[serde(rename = "p")]
    pub score: f32,
}

impl Detection {
    #[inline]
    pub fn new(bbox: BoundingBox, score: f32) -> Self {
        Self { bbox, score }
    }

    #[inline]
    pub fn ltrb(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self::new(BBox::ltrb(x1, y1, x2, y2), score)
    }

    #[inline(always)]
    pub fn center(&self) -> na::Point2<f32> {
        self.bbox.center()
    }

    #[inline]
    pub fn iou(&self, other: &Detection) -> Result<f32, Error> {
        self.bbox.iou(&other.bbox)
    }
}
