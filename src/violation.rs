use crate::bbox::BoundingBox;
use crate::config::ViolationConfig;
use crate::track::Track;
use serde_derive::{Deserialize, Serialize};

/// Emitted once per track when it first becomes stable.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ViolationEvent {
    pub track_id: u32,
    pub bbox: BoundingBox,
    pub speed: f32,
    pub over_limit: bool,
}

/// Visual state of a visible track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    Tracking,
    Stable,
    OverLimit,
}

#[derive(Debug, Clone)]
pub struct ViolationTrigger {
    config: ViolationConfig,
}

impl ViolationTrigger {
    pub fn new(config: ViolationConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn is_stable(&self, track: &Track) -> bool {
        track.frames_tracked >= self.config.stability_threshold
    }

    /// Marks a newly stable track as processed and returns its event.
    ///
    /// Every track fires exactly once, whatever its speed; `over_limit` only
    /// tells consumers how to present it.
    pub fn evaluate(&self, track: &mut Track) -> Option<ViolationEvent> {
        if !self.is_stable(track) || track.processed {
            return None;
        }

        track.processed = true;

        let event = ViolationEvent {
            track_id: track.id,
            bbox: track.bbox,
            speed: track.speed,
            over_limit: track.speed > self.config.speed_limit_kmh,
        };

        log::info!(
            "violation candidate: track {} stable at {:.2} km/h{}",
            event.track_id,
            event.speed,
            if event.over_limit { " (over limit)" } else { "" }
        );

        Some(event)
    }

    pub fn status(&self, track: &Track) -> TrackStatus {
        if !self.is_stable(track) {
            TrackStatus::Tracking
        } else if track.speed > self.config.speed_limit_kmh {
            TrackStatus::OverLimit
        } else {
            TrackStatus::Stable
        }
    }

    /// Caption a renderer draws above the track box.
    pub fn label(&self, track: &Track) -> String {
        match self.status(track) {
            TrackStatus::Tracking => format!(
                "Rastreo... ({}/{}f)",
                track.frames_tracked, self.config.stability_threshold
            ),
            TrackStatus::Stable => format!("ID:{} {:.0}km/h", track.id, track.speed),
            TrackStatus::OverLimit => format!("! {:.0} km/h", track.speed),
        }
    }
}
