//! Pick the single target rectangle for a frame.

use servo_track_core::RectCandidate;

use crate::config::SelectionParams;

/// Whether a candidate survives the area and aspect-ratio filters.
///
/// Zero-height candidates are rejected without computing an aspect ratio.
pub fn passes_filters(candidate: &RectCandidate, params: &SelectionParams) -> bool {
    if candidate.area() < params.min_area {
        return false;
    }
    let Some(aspect) = candidate.aspect_ratio() else {
        return false;
    };
    params.min_aspect_ratio <= aspect && aspect <= params.max_aspect_ratio
}

/// Largest surviving candidate by area.
///
/// Exact area ties resolve to the candidate that appears first in
/// `candidates`, so the result is a deterministic function of the detector
/// output order.
pub fn select_best(
    candidates: &[RectCandidate],
    params: &SelectionParams,
) -> Option<RectCandidate> {
    let mut best: Option<RectCandidate> = None;
    for candidate in candidates.iter().filter(|c| passes_filters(c, params)) {
        if best.is_none_or(|b| candidate.area() > b.area()) {
            best = Some(*candidate);
        }
    }
    best
}
