// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for timelines and the retiming pipeline.

use crate::range::SelectionRange;
use crate::schedule::RetimeMode;

/// Error raised by a [`Timeline`](crate::Timeline) mutation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    /// The destination time is already occupied by another keyframe
    #[error("Keyframe collision: cannot move key at {old} to occupied time {new}")]
    Collision {
        /// Original time of the moved key
        old: f64,
        /// Occupied destination time
        new: f64,
    },

    /// No keyframe exists at the given time
    #[error("No keyframe at time {time}")]
    NotFound {
        /// Time that was expected to hold a key
        time: f64,
    },

    /// The move would pass over a neighbouring keyframe
    #[error("Keyframe order violation: cannot move key at {old} past a neighbour to {new}")]
    OutOfOrder {
        /// Original time of the moved key
        old: f64,
        /// Requested destination time
        new: f64,
    },
}

/// Error raised by one stage of the retiming pipeline
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetimeError {
    /// The range starts before every keyframe and no key coincides with it
    #[error("No keyframe at or before range start {range_start}")]
    NoPrecedingKeyframe {
        /// Start of the selected range
        range_start: f64,
    },

    /// The timeline has no keyframes at all
    #[error("Timeline has no keyframes")]
    EmptyTimeline,

    /// Range bounds are reversed or not finite
    #[error("Invalid range: start {start} end {end}")]
    InvalidRange {
        /// Range start
        start: f64,
        /// Range end
        end: f64,
    },

    /// Delta cannot produce a strictly increasing schedule
    #[error("Invalid {mode} delta: {delta}")]
    InvalidDelta {
        /// Requested delta
        delta: f64,
        /// Requested mode
        mode: RetimeMode,
    },

    /// Timeline rejected a read or rename
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),
}

/// Result type for retiming stages
pub type Result<T> = std::result::Result<T, RetimeError>;

/// A failed retime invocation, with the request context needed to diagnose it
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Retime failed for range {}..={} ({mode}, delta {delta}): {source}", range.start, range.end)]
pub struct RetimeFailure {
    /// Range the invocation worked on
    pub range: SelectionRange,
    /// Spacing mode of the request
    pub mode: RetimeMode,
    /// Delta of the request
    pub delta: f64,
    /// Underlying error
    #[source]
    pub source: RetimeError,
}

impl RetimeFailure {
    /// Whether the failure happened after keyframes may have been renamed
    pub fn may_have_mutated(&self) -> bool {
        matches!(self.source, RetimeError::Timeline(_))
    }
}
