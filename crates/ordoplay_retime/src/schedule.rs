// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retime requests and target-time schedules.

use crate::error::{Result, RetimeError, TimelineError};
use crate::range::ResolvedRange;
use crate::timeline::{time_tolerance, Timeline};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest gap a retime may leave between two keys, in frames
pub const MIN_SPACING: f64 = 1.0;

/// How the delta changes the spacing inside the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetimeMode {
    /// Every gap in the selection becomes `delta` frames
    Absolute,
    /// `delta` frames are added to every gap in the selection
    Incremental,
}

impl fmt::Display for RetimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute => f.write_str("absolute"),
            Self::Incremental => f.write_str("incremental"),
        }
    }
}

/// One retime invocation's parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetimeRequest {
    /// Signed number of frames
    pub delta: f64,
    /// Spacing policy
    pub mode: RetimeMode,
    /// Move the playhead to the key after the start key when done
    #[serde(default)]
    pub reposition: bool,
}

impl RetimeRequest {
    /// Request absolute spacing of `delta` frames
    pub fn absolute(delta: f64) -> Self {
        Self {
            delta,
            mode: RetimeMode::Absolute,
            reposition: false,
        }
    }

    /// Request `delta` extra frames per gap
    pub fn incremental(delta: f64) -> Self {
        Self {
            delta,
            mode: RetimeMode::Incremental,
            reposition: false,
        }
    }

    /// Set the "move to next frame" toggle
    pub fn with_reposition(mut self, reposition: bool) -> Self {
        self.reposition = reposition;
        self
    }

    /// Reject deltas that cannot yield a strictly increasing schedule
    pub fn validate(&self) -> Result<()> {
        let valid = match self.mode {
            RetimeMode::Absolute => self.delta.is_finite() && self.delta >= MIN_SPACING,
            RetimeMode::Incremental => self.delta.is_finite(),
        };
        if valid {
            Ok(())
        } else {
            Err(RetimeError::InvalidDelta {
                delta: self.delta,
                mode: self.mode,
            })
        }
    }
}

/// Target times for every key from the start key to the last key.
///
/// Index `i` is the new time of the `i`-th original key counted from the
/// start key. The first entry is always the start key itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    targets: Vec<f64>,
}

impl Schedule {
    #[cfg(test)]
    pub(crate) fn from_targets(targets: Vec<f64>) -> Self {
        Self { targets }
    }

    /// Target times in key order
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Number of keys covered
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Always false; a schedule holds at least the start key
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Whether applying this schedule would move anything
    pub fn needs_mutation(&self) -> bool {
        self.targets.len() > 1
    }

    /// New time of the last key
    pub fn end(&self) -> f64 {
        self.targets.last().copied().unwrap_or_default()
    }
}

/// Walk the timeline from the start key to the last key and build the
/// target time of every key under `request`.
pub fn compute<T: Timeline + ?Sized>(
    timeline: &T,
    resolved: &ResolvedRange,
    request: &RetimeRequest,
) -> Result<Schedule> {
    request.validate()?;

    let range = resolved.range;
    let mut targets = vec![resolved.start_keyframe];
    let mut current = resolved.start_keyframe;
    let mut target = resolved.start_keyframe;

    let end = resolved.last_keyframe - time_tolerance(resolved.last_keyframe);
    while current < end {
        // A collaborator that does not move forward would loop forever
        let next = timeline
            .next_keyframe_after(current)
            .filter(|&next| next > current)
            .ok_or(TimelineError::NotFound {
                time: resolved.last_keyframe,
            })?;
        let original = next - current;

        let spacing = if range.covers(current) {
            match request.mode {
                RetimeMode::Incremental => (original + request.delta).max(MIN_SPACING),
                RetimeMode::Absolute => request.delta,
            }
        } else {
            original
        };

        target += spacing;
        targets.push(target);
        current = next;
    }

    tracing::debug!(
        "Computed {} schedule (delta {}) over {} keys: {} -> {}",
        request.mode,
        request.delta,
        targets.len(),
        resolved.last_keyframe,
        target
    );

    Ok(Schedule { targets })
}
