// SPDX-License-Identifier: MIT OR Apache-2.0
//! Collaborator traits the retiming engine runs against.
//!
//! The engine never owns keyframes. A host hands it something implementing
//! [`Timeline`] (and [`TimeControl`] for the facade) so the algorithm can be
//! driven by the editor's tracks or by an in-memory fake in tests.

use crate::error::TimelineError;
use crate::range::SelectionRange;

/// Two keyframe times closer than this (in frames) are the same time
pub const TIME_EPSILON: f64 = 1e-6;

/// Tolerance for comparing keyframe times near `time`.
///
/// `TIME_EPSILON` for ordinary frame numbers, widening to a few ulps once
/// `time` is large enough that `time + TIME_EPSILON == time`.
pub fn time_tolerance(time: f64) -> f64 {
    TIME_EPSILON.max(time.abs() * 4.0 * f64::EPSILON)
}

/// Whether two keyframe times are the same time
pub fn same_time(a: f64, b: f64) -> bool {
    (a - b).abs() < time_tolerance(a.abs().max(b.abs()))
}

/// Ordered, strictly increasing keyframe times that can be renamed in place
pub trait Timeline {
    /// First keyframe strictly after `time`
    fn next_keyframe_after(&self, time: f64) -> Option<f64>;

    /// Last keyframe at or before `time`
    fn previous_keyframe_at_or_before(&self, time: f64) -> Option<f64>;

    /// First keyframe of the whole timeline
    fn first_keyframe(&self) -> Option<f64>;

    /// Last keyframe of the whole timeline
    fn last_keyframe(&self) -> Option<f64>;

    /// Whether a keyframe sits exactly at `time`
    fn keyframe_exists_at(&self, time: f64) -> bool;

    /// Move the keyframe at `old` to `new`.
    ///
    /// Fails with [`TimelineError::Collision`] if `new` is occupied by another
    /// key and [`TimelineError::NotFound`] if there is no key at `old`.
    fn rename(&mut self, old: f64, new: f64) -> Result<(), TimelineError>;
}


/// Host time controls: playhead and playback-range selection
pub trait TimeControl {
    /// Current playhead time
    fn playhead(&self) -> f64;

    /// Move the playhead
    fn set_playhead(&mut self, time: f64);

    /// Range currently selected by the user
    fn selected_range(&self) -> SelectionRange;
}
