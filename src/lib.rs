pub mod bbox;
pub mod config;
pub mod decoder;
pub mod detection;
pub mod error;
pub mod frame;
pub mod math;
pub mod nms;
pub mod plate;
pub mod report;
pub mod tracker;
pub mod violation;

mod track;

pub use config::Config;
pub use detection::Detection;
pub use frame::Frame;
pub use track::Track;
pub use tracker::{TrackSet, VehicleTracker};
pub use violation::{ViolationEvent, ViolationTrigger};

use chrono::NaiveTime;
use decoder::Decoder;
use error::Error;
use plate::PlateText;
use report::{ViolationLog, ViolationRecord};
use std::rc::Rc;

/// Result of one processed frame.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub detections: Vec<Detection>,
    pub tracks: Rc<[Track]>,
    pub violations: Vec<ViolationEvent>,
}

/// Per-stream pipeline state: decoder, tracker, trigger and violation log.
///
/// Frames must be fed in temporal order, one call at a time.
pub struct Session {
    config: Config,
    decoder: Decoder,
    tracker: VehicleTracker,
    trigger: ViolationTrigger,
    log: ViolationLog,
}

impl Session {
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            decoder: Decoder::new(config.detection.clone()),
            tracker: VehicleTracker::new(config.tracking.clone()),
            trigger: ViolationTrigger::new(config.violation.clone()),
            log: ViolationLog::new(),
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn tracker(&self) -> &VehicleTracker {
        &self.tracker
    }

    #[inline]
    pub fn trigger(&self) -> &ViolationTrigger {
        &self.trigger
    }

    #[inline]
    pub fn violations(&self) -> &ViolationLog {
        &self.log
    }

    /// Decodes a raw frame and advances the tracker with its detections.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameOutcome, Error> {
        let detections = self
            .decoder
            .decode(&frame.data, &frame.dims, &frame.letterbox)?;

        Ok(self.process_detections(detections))
    }

    /// Advances the tracker with already decoded detections.
    pub fn process_detections(&mut self, detections: Vec<Detection>) -> FrameOutcome {
        self.tracker.update(&detections);
        let violations = self.tracker.trigger_violations(&self.trigger);

        FrameOutcome {
            detections,
            tracks: self.tracks(),
            violations,
        }
    }

    /// Snapshot of all live tracks, lost ones included.
    pub fn tracks(&self) -> Rc<[Track]> {
        self.tracker.tracks().values().cloned().collect()
    }

    pub fn record_violation(
        &mut self,
        event: &ViolationEvent,
        plate: &PlateText,
        time: NaiveTime,
    ) -> Option<&ViolationRecord> {
        self.log.record(event, plate, time)
    }
}
