use crate::bbox::{BBox, BoundingBox, Xywh};
use crate::config::DetectionConfig;
use crate::detection::Detection;
use crate::error::Error;
use crate::nms::non_maximum_suppression;

use ndarray::prelude::*;
use serde_derive::{Deserialize, Serialize};

/// `[xc, yc, w, h, score]` lead every anchor in both layouts.
const BOX_CHANNELS: usize = 5;

/// Uniform scale plus padding that fitted the source frame into the model input.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Default for Letterbox {
    fn default() -> Self {
        Self {
            scale: 1.0,
            dx: 0.0,
            dy: 0.0,
        }
    }
}

impl Letterbox {
    pub fn new(scale: f32, dx: f32, dy: f32) -> Self {
        Self { scale, dx, dy }
    }

    /// Letterbox for a `frame_width`x`frame_height` frame in a square `input_size` input.
    pub fn fit(frame_width: u32, frame_height: u32, input_size: u32) -> Self {
        let size = input_size as f32;
        let (fw, fh) = (frame_width as f32, frame_height as f32);

        let scale = (size / fw).min(size / fh);
        let new_w = (fw * scale).round();
        let new_h = (fh * scale).round();

        Self {
            scale,
            dx: (size - new_w) / 2.0,
            dy: (size - new_h) / 2.0,
        }
    }

    /// Maps a model-space center box back to source-image pixels.
    #[inline]
    pub fn unmap(&self, b: &BBox<Xywh>) -> BoundingBox {
        let (xc, yc, w, h) = (b.cx(), b.cy(), b.width(), b.height());

        BBox::ltrb(
            (xc - w / 2.0 - self.dx) / self.scale,
            (yc - h / 2.0 - self.dy) / self.scale,
            (xc + w / 2.0 - self.dx) / self.scale,
            (yc + h / 2.0 - self.dy) / self.scale,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[batch, channels, anchors]`, each channel strided by the anchor count
    ChannelMajor { anchors: usize },
    /// `[batch, anchors, props]`, one contiguous row per anchor
    AnchorMajor { anchors: usize, props: usize },
}

impl TensorLayout {
    pub fn detect(dims: &[usize], channel_major_anchors: usize) -> Result<Self, Error> {
        let layout_error = || Error::DecodeLayout {
            dims: dims.to_vec(),
        };

        let &[batch, d1, d2] = dims else {
            return Err(layout_error());
        };

        if batch == 0 {
            return Err(layout_error());
        }

        if d2 == channel_major_anchors && d1 >= BOX_CHANNELS {
            Ok(TensorLayout::ChannelMajor { anchors: d2 })
        } else if d2 >= BOX_CHANNELS {
            Ok(TensorLayout::AnchorMajor {
                anchors: d1,
                props: d2,
            })
        } else {
            Err(layout_error())
        }
    }

    #[inline]
    pub fn anchors(&self) -> usize {
        match *self {
            TensorLayout::ChannelMajor { anchors } => anchors,
            TensorLayout::AnchorMajor { anchors, .. } => anchors,
        }
    }
}

pub struct Decoder {
    config: DetectionConfig,
}

impl Decoder {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Decodes one output tensor and runs NMS over the candidates.
    pub fn decode(
        &self,
        data: &[f32],
        dims: &[usize],
        letterbox: &Letterbox,
    ) -> Result<Vec<Detection>, Error> {
        let candidates = self.candidates(data, dims, letterbox)?;
        let count = candidates.len();
        let dets = non_maximum_suppression(candidates, self.config.nms_threshold);

        log::debug!("decoded {} candidates, {} after nms", count, dets.len());

        Ok(dets)
    }

    /// All anchors of the first batch passing the score threshold, without NMS.
    pub fn candidates(
        &self,
        data: &[f32],
        dims: &[usize],
        letterbox: &Letterbox,
    ) -> Result<Vec<Detection>, Error> {
        let layout = TensorLayout::detect(dims, self.config.channel_major_anchors)?;
        let view = ArrayView3::from_shape((dims[0], dims[1], dims[2]), data)?;
        let batch = view.index_axis(Axis(0), 0);

        let mut results = Vec::new();

        for index in 0..layout.anchors() {
            let anchor = match layout {
                TensorLayout::ChannelMajor { .. } => batch.column(index),
                TensorLayout::AnchorMajor { .. } => batch.row(index),
            };

            let (xc, yc, w, h, score) = (anchor[0], anchor[1], anchor[2], anchor[3], anchor[4]);

            // NaN scores are dropped too
            if !(score >= self.config.score_threshold) {
                continue;
            }

            let bbox = letterbox.unmap(&BBox::xywh(xc, yc, w, h));
            results.push(Detection::new(bbox, score));
        }

        Ok(results)
    }
}
