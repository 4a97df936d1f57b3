use crate::detection::Detection;

pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// Greedy non-maximum suppression.
///
/// Candidates are sorted by descending score (equal scores keep their input
/// order) and every still-active candidate suppresses the later active ones
/// overlapping it by more than `iou_threshold`. Survivors come back in sorted
/// order. Degenerate boxes never survive.
pub fn non_maximum_suppression(mut dets: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    let before = dets.len();
    dets.retain(|d| !d.bbox.is_degenerate());
    if dets.len() < before {
        log::debug!("nms: dropped {} degenerate boxes", before - dets.len());
    }

    // `sort_by` is stable, which keeps the output deterministic on ties
    dets.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut active = vec![true; dets.len()];
    for idx in 0..dets.len() {
        if !active[idx] {
            continue;
        }

        for other in idx + 1..dets.len() {
            if !active[other] {
                continue;
            }

            // both boxes were checked above, a failure here means zero overlap
            let iou = dets[idx].iou(&dets[other]).unwrap_or(0.0);
            if iou > iou_threshold {
                active[other] = false;
            }
        }
    }

    dets.into_iter()
        .zip(active)
        .filter_map(|(det, keep)| keep.then_some(det))
        .collect()
}
