use crate::error::Error;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Side of the square model input, in pixels
    pub input_size: u32,
    /// Candidates below this score are dropped before NMS
    pub score_threshold: f32,
    pub nms_threshold: f32,
    /// Anchor count identifying the channel-major output layout
    pub channel_major_anchors: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            input_size: 640,
            score_threshold: 0.01,
            nms_threshold: 0.45,
            channel_major_anchors: 8400,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackingConfig {
    pub fps_assumed: f32,
    pub px_per_meter: f32,
    /// Gating distance between a detection center and a track center, in pixels
    pub max_tracking_distance: f32,
    /// Tracks lost for more frames than this are not matched anymore
    pub lost_skip_bound: u32,
    /// Tracks lost for more frames than this are destroyed
    pub max_lost: u32,
    /// Weight of the newest speed sample in the running average
    pub speed_smoothing: f32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            fps_assumed: 8.0,
            px_per_meter: 40.0,
            max_tracking_distance: 400.0,
            lost_skip_bound: 5,
            max_lost: 20,
            speed_smoothing: 0.4,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViolationConfig {
    /// Matched frames needed before a track is considered stable
    pub stability_threshold: u32,
    pub speed_limit_kmh: f32,
}

impl Default for ViolationConfig {
    fn default() -> Self {
        Self {
            stability_threshold: 3,
            speed_limit_kmh: 50.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub tracking: TrackingConfig,
    pub violation: ViolationConfig,
}

impl Config {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_json_str(src: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let d = &self.detection;
        let t = &self.tracking;

        if d.input_size == 0 {
            return Err(Error::Config("detection.input_size must be positive".into()));
        }

        for (name, value) in [
            ("detection.score_threshold", d.score_threshold),
            ("detection.nms_threshold", d.nms_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{} must be in [0, 1], got {}", name, value)));
            }
        }

        for (name, value) in [
            ("tracking.fps_assumed", t.fps_assumed),
            ("tracking.px_per_meter", t.px_per_meter),
            ("tracking.max_tracking_distance", t.max_tracking_distance),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::Config(format!("{} must be positive, got {}", name, value)));
            }
        }

        if !(t.speed_smoothing > 0.0 && t.speed_smoothing <= 1.0) {
            return Err(Error::Config(format!(
                "tracking.speed_smoothing must be in (0, 1], got {}",
                t.speed_smoothing
            )));
        }

        if !self.violation.speed_limit_kmh.is_finite() {
            return Err(Error::Config("violation.speed_limit_kmh must be finite".into()));
        }

        Ok(())
    }
}
