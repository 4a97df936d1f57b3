//! Boundary with the plate-reading (OCR) engine.
//!
//! The engine itself lives outside this crate. Here are the crop geometry it
//! is fed with, the character whitelist it is configured with and the rules
//! turning its raw output into a [`PlateText`].

use crate::bbox::{BBox, BoundingBox, Ltwh};
use crate::violation::ViolationEvent;
use std::fmt;

pub const PLATE_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const UNREADABLE_SENTINEL: &str = "?";
pub const FAILED_SENTINEL: &str = "Err";

const MIN_PLATE_LEN: usize = 3;
const MAX_PLATE_LEN: usize = 10;

/// Crop margin, relative to the box size on each side
const CROP_MARGIN: f32 = 0.1;
const CROP_UPSCALE: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlateText {
    Plate(String),
    /// Engine ran but produced nothing usable (`"?"`)
    Unreadable,
    /// Engine failed (`"Err"`)
    Failed,
}

impl PlateText {
    /// Keeps whitelisted characters of the engine output.
    pub fn normalize(raw: &str) -> Self {
        let text: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            .collect();

        if (MIN_PLATE_LEN..=MAX_PLATE_LEN).contains(&text.len()) {
            PlateText::Plate(text)
        } else {
            PlateText::Unreadable
        }
    }

    /// Parses the string contract of the engine, sentinels included.
    pub fn from_engine(raw: &str) -> Self {
        match raw {
            FAILED_SENTINEL => PlateText::Failed,
            UNREADABLE_SENTINEL => PlateText::Unreadable,
            _ => Self::normalize(raw),
        }
    }

    #[inline]
    pub fn plate(&self) -> Option<&str> {
        match self {
            PlateText::Plate(p) => Some(p),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            PlateText::Plate(p) => p,
            PlateText::Unreadable => UNREADABLE_SENTINEL,
            PlateText::Failed => FAILED_SENTINEL,
        }
    }
}

impl fmt::Display for PlateText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something able to read the plate of a violating vehicle.
pub trait PlateReader {
    fn read(&mut self, event: &ViolationEvent) -> PlateText;
}

/// Region of the frame handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateCrop {
    pub region: BBox<Ltwh>,
}

impl PlateCrop {
    /// Box grown by 10% per side, clamped to the frame.
    pub fn around(bbox: &BoundingBox, frame_width: f32, frame_height: f32) -> Self {
        let (w, h) = (bbox.width(), bbox.height());
        let pad_x = w * CROP_MARGIN;
        let pad_y = h * CROP_MARGIN;

        let x = (bbox.left() - pad_x).max(0.0);
        let y = (bbox.top() - pad_y).max(0.0);
        let cw = (frame_width - x).min(w + 2.0 * pad_x);
        let ch = (frame_height - y).min(h + 2.0 * pad_y);

        Self {
            region: BBox::ltwh(x, y, cw, ch),
        }
    }

    /// Size of the upscaled canvas the crop is drawn into.
    #[inline]
    pub fn upscaled(&self) -> (f32, f32) {
        (
            self.region.width() * CROP_UPSCALE,
            self.region.height() * CROP_UPSCALE,
        )
    }
}

/// BT.709 luma of an RGB pixel.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32;

    y.round().clamp(0.0, 255.0) as u8
}
