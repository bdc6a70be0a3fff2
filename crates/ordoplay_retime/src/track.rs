// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory keyframe track.
//!
//! A [`Track`] keeps its keyframes sorted by time and refuses any edit that
//! would create a duplicate or reorder keys, the same guarantees the editor's
//! animation storage gives the retiming engine.

use crate::error::TimelineError;
use crate::keyframe::{Keyframe, KeyframeId};
use crate::timeline::{same_time, time_tolerance, Timeline};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// A track of keyframes ordered by time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    #[serde(default)]
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Keyframes, strictly increasing in time
    #[serde(default)]
    keyframes: Vec<Keyframe>,
}

impl Track {
    /// Create a new empty track
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            keyframes: Vec::new(),
        }
    }

    /// Create a track with default-valued keys at the given times
    pub fn with_times(name: impl Into<String>, times: &[f64]) -> Result<Self, TimelineError> {
        let mut track = Self::new(name);
        for &time in times {
            track.add_keyframe(Keyframe::at(time))?;
        }
        Ok(track)
    }

    /// Insert a keyframe, keeping the track sorted
    pub fn add_keyframe(&mut self, keyframe: Keyframe) -> Result<(), TimelineError> {
        if self.index_at(keyframe.time).is_some() {
            return Err(TimelineError::Collision {
                old: keyframe.time,
                new: keyframe.time,
            });
        }
        let idx = self.keyframes.partition_point(|k| k.time < keyframe.time);
        self.keyframes.insert(idx, keyframe);
        Ok(())
    }

    /// Remove a keyframe
    pub fn remove_keyframe(&mut self, keyframe_id: KeyframeId) -> Option<Keyframe> {
        let idx = self.keyframes.iter().position(|k| k.id == keyframe_id)?;
        Some(self.keyframes.remove(idx))
    }

    /// Get keyframe at time (if exists)
    pub fn keyframe_at(&self, time: f64) -> Option<&Keyframe> {
        self.index_at(time).map(|idx| &self.keyframes[idx])
    }

    /// Get keyframe by ID
    pub fn keyframe(&self, keyframe_id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.id == keyframe_id)
    }

    /// Get all keyframes
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Keyframe times in order
    pub fn times(&self) -> Vec<f64> {
        self.keyframes.iter().map(|k| k.time).collect()
    }

    /// Get keyframe count
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Get the duration (time of last keyframe)
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map(|k| k.time).unwrap_or(0.0)
    }

    /// Whether every key is finite and strictly after its predecessor.
    ///
    /// Tracks loaded from disk bypass [`Track::add_keyframe`], so callers check
    /// this before handing them to the engine.
    pub fn is_well_ordered(&self) -> bool {
        self.keyframes.iter().all(|k| k.time.is_finite())
            && self
                .keyframes
                .windows(2)
                .all(|pair| pair[1].time - pair[0].time >= time_tolerance(pair[1].time))
    }

    fn index_at(&self, time: f64) -> Option<usize> {
        let tolerance = time_tolerance(time);
        let idx = self.keyframes.partition_point(|k| k.time < time - tolerance);
        self.keyframes
            .get(idx)
            .filter(|k| same_time(k.time, time))
            .map(|_| idx)
    }

    /// Number of keys at or before `time`
    fn count_at_or_before(&self, time: f64) -> usize {
        let tolerance = time_tolerance(time);
        self.keyframes.partition_point(|k| k.time < time + tolerance)
    }
}

impl Timeline for Track {
    fn next_keyframe_after(&self, time: f64) -> Option<f64> {
        self.keyframes.get(self.count_at_or_before(time)).map(|k| k.time)
    }

    fn previous_keyframe_at_or_before(&self, time: f64) -> Option<f64> {
        match self.count_at_or_before(time) {
            0 => None,
            n => Some(self.keyframes[n - 1].time),
        }
    }

    fn first_keyframe(&self) -> Option<f64> {
        self.keyframes.first().map(|k| k.time)
    }

    fn last_keyframe(&self) -> Option<f64> {
        self.keyframes.last().map(|k| k.time)
    }

    fn keyframe_exists_at(&self, time: f64) -> bool {
        self.index_at(time).is_some()
    }

    fn rename(&mut self, old: f64, new: f64) -> Result<(), TimelineError> {
        let idx = self.index_at(old).ok_or(TimelineError::NotFound { time: old })?;
        if same_time(old, new) {
            return Ok(());
        }
        if self.index_at(new).is_some() {
            return Err(TimelineError::Collision { old, new });
        }

        let after_prev = idx == 0 || self.keyframes[idx - 1].time < new;
        let before_next = self.keyframes.get(idx + 1).map_or(true, |k| new < k.time);
        if !(after_prev && before_next) {
            return Err(TimelineError::OutOfOrder { old, new });
        }

        self.keyframes[idx].time = new;
        Ok(())
    }
}
