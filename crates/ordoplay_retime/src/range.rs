// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection range and start/end keyframe resolution.

use crate::error::{Result, RetimeError};
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// Playback-range selection, in frames. `start == end` selects a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRange {
    /// First selected frame
    pub start: f64,
    /// Last selected frame (inclusive)
    pub end: f64,
}

impl SelectionRange {
    /// Create a validated range
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return Err(RetimeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single frame
    pub fn frame(time: f64) -> Result<Self> {
        Self::new(time, time)
    }

    /// Whether a retime walk standing at `time` is still inside the selection.
    ///
    /// The walk never visits keys before the resolved start key, so only the
    /// upper bound is checked, and it is inclusive.
    pub fn covers(&self, time: f64) -> bool {
        time <= self.end
    }
}

/// Keyframes bounding a retime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRange {
    /// Selection the keys were resolved from
    pub range: SelectionRange,
    /// Key at the range start, or the nearest one before it
    pub start_keyframe: f64,
    /// Last key of the whole timeline
    pub last_keyframe: f64,
}

/// Find the keyframes a retime of `range` starts from and runs to.
pub fn resolve<T: Timeline + ?Sized>(timeline: &T, range: SelectionRange) -> Result<ResolvedRange> {
    // Includes a key sitting on range.start, at its stored time
    let start_keyframe = timeline
        .previous_keyframe_at_or_before(range.start)
        .ok_or(RetimeError::NoPrecedingKeyframe {
            range_start: range.start,
        })?;
    let last_keyframe = timeline.last_keyframe().ok_or(RetimeError::EmptyTimeline)?;

    tracing::debug!(
        "Resolved range {}..={}: start key {}, last key {}",
        range.start,
        range.end,
        start_keyframe,
        last_keyframe
    );

    Ok(ResolvedRange {
        range,
        start_keyframe,
        last_keyframe,
    })
}
