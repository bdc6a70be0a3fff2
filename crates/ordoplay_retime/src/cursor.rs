// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playhead placement after a retime.

use crate::range::SelectionRange;
use crate::schedule::RetimeRequest;
use crate::timeline::Timeline;

/// Pick the playhead time once `timeline` has been retimed.
///
/// With "move to next frame" set and a selection that does not start before
/// the first key, the playhead lands on the key after the start key (or the
/// start key when it is the last one). Otherwise it goes back to the start key,
/// unless the whole selection precedes the first key, in which case nothing was
/// retimed and it stays on the range start.
pub fn reposition<T: Timeline + ?Sized>(
    timeline: &T,
    range: SelectionRange,
    start_keyframe: f64,
    request: &RetimeRequest,
) -> f64 {
    let Some(first_keyframe) = timeline.first_keyframe() else {
        return range.start;
    };

    if request.reposition && range.start >= first_keyframe {
        timeline
            .next_keyframe_after(start_keyframe)
            .unwrap_or(start_keyframe)
    } else if range.end > first_keyframe {
        start_keyframe
    } else {
        range.start
    }
}
