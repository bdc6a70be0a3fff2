// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence of keyframe tracks with playhead and selection.
//!
//! A [`Sequence`] is the document the retiming host edits. It is stored as
//! RON; ids may be omitted in hand-written files and are generated on load.

use crate::error::TimelineError;
use crate::range::SelectionRange;
use crate::timeline::{TimeControl, Timeline};
use crate::track::{Track, TrackId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Unique identifier for a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceId(pub Uuid);

impl SequenceId {
    /// Create a new random sequence ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SequenceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors loading or saving a sequence
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("Failed to parse sequence: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Failed to serialize sequence: {0}")]
    Serialize(#[from] ron::Error),

    /// Track keys are not strictly increasing
    #[error("Track '{0}' has duplicate or unordered keyframes")]
    UnorderedTrack(String),

    /// Frame rate is zero, negative or not finite
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f64),

    /// Selection start is after its end
    #[error("Invalid selection {start}..={end}")]
    InvalidSelection {
        /// Selection start
        start: f64,
        /// Selection end
        end: f64,
    },
}

/// A set of tracks sharing a playhead and a selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    /// Unique sequence ID
    #[serde(default)]
    pub id: SequenceId,
    /// Sequence name
    pub name: String,
    /// Frames per second; keyframe times are in frames
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    /// Tracks in this sequence
    #[serde(with = "track_list")]
    tracks: IndexMap<TrackId, Track>,
    /// Current playhead time
    #[serde(default)]
    pub playhead: f64,
    /// Playback-range selection
    pub selection: SelectionRange,
}

fn default_frame_rate() -> f64 {
    30.0
}

impl Sequence {
    /// Create a new empty sequence
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SequenceId::new(),
            name: name.into(),
            frame_rate: default_frame_rate(),
            tracks: IndexMap::new(),
            playhead: 0.0,
            selection: SelectionRange { start: 0.0, end: 0.0 },
        }
    }

    /// Add a track
    pub fn add_track(&mut self, track: Track) -> TrackId {
        let id = track.id;
        self.tracks.insert(id, track);
        id
    }

    /// Remove a track
    pub fn remove_track(&mut self, track_id: TrackId) -> Option<Track> {
        self.tracks.shift_remove(&track_id)
    }

    /// Get a track
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Get a mutable track
    pub fn track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&track_id)
    }

    /// Find a track by name
    pub fn track_by_name(&self, name: &str) -> Option<&Track> {
        self.tracks.values().find(|t| t.name == name)
    }

    /// Get all tracks
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Time of the last key on any track
    pub fn content_duration(&self) -> f64 {
        self.tracks.values().map(Track::duration).fold(0.0, f64::max)
    }

    /// Convert a time in frames to seconds
    pub fn seconds(&self, time: f64) -> f64 {
        time / self.frame_rate
    }

    /// Bind one track together with the playhead and selection for retiming
    pub fn timeline(&mut self, track_id: TrackId) -> Option<SequenceTimeline<'_>> {
        let track = self.tracks.get_mut(&track_id)?;
        Some(SequenceTimeline {
            track,
            playhead: &mut self.playhead,
            selection: self.selection,
        })
    }

    /// Check track ordering and selection bounds
    pub fn validate(&self) -> Result<(), SequenceError> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(SequenceError::InvalidFrameRate(self.frame_rate));
        }
        if let Some(track) = self.tracks.values().find(|t| !t.is_well_ordered()) {
            return Err(SequenceError::UnorderedTrack(track.name.clone()));
        }
        let SelectionRange { start, end } = self.selection;
        if SelectionRange::new(start, end).is_err() {
            return Err(SequenceError::InvalidSelection { start, end });
        }
        Ok(())
    }

    /// Parse and validate a sequence from RON
    pub fn from_ron(text: &str) -> Result<Self, SequenceError> {
        let sequence: Sequence = ron::from_str(text)?;
        sequence.validate()?;
        Ok(sequence)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, SequenceError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(false)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load a sequence file
    pub fn load(path: &Path) -> Result<Self, SequenceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save a sequence file
    pub fn save(&self, path: &Path) -> Result<(), SequenceError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new("Untitled Sequence")
    }
}

/// One track of a [`Sequence`] plus its time controls
pub struct SequenceTimeline<'a> {
    track: &'a mut Track,
    playhead: &'a mut f64,
    selection: SelectionRange,
}

impl SequenceTimeline<'_> {
    /// The bound track
    pub fn track(&self) -> &Track {
        self.track
    }
}

impl Timeline for SequenceTimeline<'_> {
    fn next_keyframe_after(&self, time: f64) -> Option<f64> {
        self.track.next_keyframe_after(time)
    }

    fn previous_keyframe_at_or_before(&self, time: f64) -> Option<f64> {
        self.track.previous_keyframe_at_or_before(time)
    }

    fn first_keyframe(&self) -> Option<f64> {
        self.track.first_keyframe()
    }

    fn last_keyframe(&self) -> Option<f64> {
        self.track.last_keyframe()
    }

    fn keyframe_exists_at(&self, time: f64) -> bool {
        self.track.keyframe_exists_at(time)
    }

    fn rename(&mut self, old: f64, new: f64) -> Result<(), TimelineError> {
        self.track.rename(old, new)
    }
}

impl TimeControl for SequenceTimeline<'_> {
    fn playhead(&self) -> f64 {
        *self.playhead
    }

    fn set_playhead(&mut self, time: f64) {
        *self.playhead = time;
    }

    fn selected_range(&self) -> SelectionRange {
        self.selection
    }
}

/// Tracks are written as a plain list and re-keyed by id on load
mod track_list {
    use super::{Track, TrackId};
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tracks: &IndexMap<TrackId, Track>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(tracks.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<IndexMap<TrackId, Track>, D::Error> {
        let tracks = Vec::<Track>::deserialize(deserializer)?;
        Ok(tracks.into_iter().map(|t| (t.id, t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::KeyframeValue;

    const WALK: &str = r#"(
        name: "Walk",
        tracks: [
            (
                name: "hips.translateY",
                keyframes: [
                    (time: 0.0, value: Float(1.0)),
                    (time: 6.0, value: Float(0.8)),
                    (time: 12.0, value: Float(1.0)),
                ],
            ),
        ],
        playhead: 3.0,
        selection: (start: 0.0, end: 6.0),
    )"#;

    #[test]
    fn test_parse_hand_written() {
        let sequence = Sequence::from_ron(WALK).unwrap();
        assert_eq!(sequence.name, "Walk");
        assert_eq!(sequence.track_count(), 1);
        let track = sequence.track_by_name("hips.translateY").unwrap();
        assert_eq!(track.times(), vec![0.0, 6.0, 12.0]);
        assert_eq!(track.keyframes()[1].value, KeyframeValue::Float(0.8));
        assert_eq!(sequence.content_duration(), 12.0);
        assert_eq!(sequence.frame_rate, 30.0);
        assert_eq!(sequence.seconds(12.0), 0.4);
    }

    #[test]
    fn test_rejects_bad_frame_rate() {
        let text = WALK.replace("name: \"Walk\",", "name: \"Walk\", frame_rate: 0.0,");
        let err = Sequence::from_ron(&text).unwrap_err();
        assert!(matches!(err, SequenceError::InvalidFrameRate(rate) if rate == 0.0));
    }

    #[test]
    fn test_serialization() {
        let sequence = Sequence::from_ron(WALK).unwrap();
        let text = sequence.to_ron().unwrap();
        let loaded = Sequence::from_ron(&text).unwrap();
        assert_eq!(loaded, sequence);
    }

    #[test]
    fn test_rejects_unordered_track() {
        let text = WALK.replace("time: 6.0", "time: 12.0");
        let err = Sequence::from_ron(&text).unwrap_err();
        assert!(matches!(err, SequenceError::UnorderedTrack(name) if name == "hips.translateY"));
    }

    #[test]
    fn test_rejects_reversed_selection() {
        let text = WALK.replace("(start: 0.0, end: 6.0)", "(start: 6.0, end: 0.0)");
        let err = Sequence::from_ron(&text).unwrap_err();
        assert!(matches!(err, SequenceError::InvalidSelection { .. }));
    }

    #[test]
    fn test_timeline_binding() {
        let mut sequence = Sequence::new("Bind");
        let id = sequence.add_track(Track::with_times("a", &[0.0, 5.0]).unwrap());
        sequence.selection = SelectionRange::new(0.0, 5.0).unwrap();

        {
            let mut timeline = sequence.timeline(id).unwrap();
            assert_eq!(timeline.selected_range(), SelectionRange { start: 0.0, end: 5.0 });
            timeline.rename(5.0, 7.0).unwrap();
            timeline.set_playhead(7.0);
            assert_eq!(timeline.track().times(), vec![0.0, 7.0]);
        }

        assert_eq!(sequence.playhead, 7.0);
        assert_eq!(sequence.track(id).unwrap().times(), vec![0.0, 7.0]);
        assert!(sequence.timeline(TrackId::new()).is_none());
    }

    #[test]
    fn test_remove_track() {
        let mut sequence = Sequence::default();
        let id = sequence.add_track(Track::new("a"));
        assert!(sequence.remove_track(id).is_some());
        assert_eq!(sequence.track_count(), 0);
    }
}
