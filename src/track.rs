use crate::bbox::BoundingBox;
use crate::detection::Detection;
use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    #[serde(
        serialize_with = "serialize_point",
        deserialize_with = "deserialize_point"
    )]
    pub center: na::Point2<f32>,
    pub bbox: BoundingBox,

    // km/h, smoothed
    pub speed: f32,

    /// Number of successful matches since creation
    pub frames_tracked: u32,

    /// Consecutive frames without a match
    pub lost: u32,

    /// Set once the violation trigger has fired, never cleared
    pub processed: bool,
}

impl Track {
    pub(crate) fn new(id: u32, det: &Detection) -> Self {
        Self {
            id,
            center: det.center(),
            bbox: det.bbox,
            speed: 0.0,
            frames_tracked: 0,
            lost: 0,
            processed: false,
        }
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.lost == 0
    }
}

fn serialize_point<S: serde::Serializer>(p: &na::Point2<f32>, s: S) -> Result<S::Ok, S::Error> {
    use serde::Serialize;

    [p.x, p.y].serialize(s)
}

fn deserialize_point<'de, D: serde::Deserializer<'de>>(d: D) -> Result<na::Point2<f32>, D::Error> {
    use serde::Deserialize;

    let [x, y] = <[f32; 2]>::deserialize(d)?;
    Ok(na::Point2::new(x, y))
}
