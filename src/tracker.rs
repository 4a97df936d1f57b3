use std::collections::{BTreeMap, HashSet};

use crate::config::TrackingConfig;
use crate::detection::Detection;
use crate::math;
use crate::track::Track;
use crate::violation::{ViolationEvent, ViolationTrigger};

use nalgebra as na;

/// Live tracks addressed by id, iterated in ascending id order.
pub type TrackSet = BTreeMap<u32, Track>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assignment {
    Matched(u32),
    New,
}

/// Greedy nearest-centroid tracker.
///
/// Detections are assigned in input order, each to the closest still
/// unclaimed track within the gating distance. Assignment is local, not a
/// global optimum: an early detection can take a track that a later one was
/// closer to.
#[derive(Debug)]
pub struct VehicleTracker {
    config: TrackingConfig,
    tracks: TrackSet,
    next_id: u32,
}

impl VehicleTracker {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            config,
            tracks: BTreeMap::new(),
            next_id: 1,
        }
    }

    #[inline]
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    #[inline]
    pub fn tracks(&self) -> &TrackSet {
        &self.tracks
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Tracks matched or created on the last update.
    pub fn visible(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values().filter(|t| t.is_visible())
    }

    /// Advances all tracks by one frame.
    pub fn update(&mut self, detections: &[Detection]) -> &TrackSet {
        let assignments = self.assign(detections);
        self.apply(detections, &assignments);

        &self.tracks
    }

    /// Fires the trigger on every visible track.
    pub fn trigger_violations(&mut self, trigger: &ViolationTrigger) -> Vec<ViolationEvent> {
        self.tracks
            .values_mut()
            .filter(|t| t.is_visible())
            .filter_map(|t| trigger.evaluate(t))
            .collect()
    }

    fn assign(&self, detections: &[Detection]) -> Vec<Assignment> {
        let mut claimed = HashSet::new();

        detections
            .iter()
            .map(|det| {
                let center = det.center();
                let mut best: Option<(u32, f32)> = None;

                for (&id, track) in &self.tracks {
                    if track.lost > self.config.lost_skip_bound || claimed.contains(&id) {
                        continue;
                    }

                    // NaN distances never pass the gate
                    let dist = na::distance(&center, &track.center);
                    if !(dist < self.config.max_tracking_distance) {
                        continue;
                    }

                    if best.map_or(true, |(_, min)| dist < min) {
                        best = Some((id, dist));
                    }
                }

                match best {
                    Some((id, _)) => {
                        claimed.insert(id);
                        Assignment::Matched(id)
                    }
                    None => Assignment::New,
                }
            })
            .collect()
    }

    fn apply(&mut self, detections: &[Detection], assignments: &[Assignment]) {
        let mut touched = HashSet::with_capacity(detections.len());

        for (det, assignment) in detections.iter().zip(assignments) {
            match *assignment {
                Assignment::Matched(id) => {
                    if let Some(track) = self.tracks.get_mut(&id) {
                        let center = det.center();

                        // vertical displacement only
                        let dy = (center.y - track.center.y).abs();
                        let sample =
                            math::speed_kmh(dy, self.config.px_per_meter, self.config.fps_assumed);

                        track.speed = math::ema(track.speed, sample, self.config.speed_smoothing);
                        track.center = center;
                        track.bbox = det.bbox;
                        track.lost = 0;
                        track.frames_tracked += 1;
                    }

                    touched.insert(id);
                }

                Assignment::New => {
                    let id = self.next_id;
                    self.next_id += 1;

                    log::debug!("track {} created at {:?}", id, det.bbox.as_slice());

                    self.tracks.insert(id, Track::new(id, det));
                    touched.insert(id);
                }
            }
        }

        let max_lost = self.config.max_lost;
        self.tracks.retain(|id, track| {
            if touched.contains(id) {
                return true;
            }

            track.lost += 1;
            if track.lost > max_lost {
                log::debug!("track {} destroyed after {} lost frames", id, track.lost);
                return false;
            }

            true
        });
    }
}
