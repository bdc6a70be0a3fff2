// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence commands for undo/redo support.

use crate::history::HistoryError;
use ordoplay_retime::{
    RetimeError, RetimeFailure, RetimeMode, RetimeOutcome, RetimeRequest, Retimer, SelectionRange,
    Sequence, TrackId,
};

/// A sequence edit that the session records as one undo step
pub trait SequenceCommand {
    /// Get a description of this command
    fn description(&self) -> &str;

    /// Execute the command
    fn execute(&self, sequence: &mut Sequence) -> Result<RetimeOutcome, CommandError>;
}

/// Error type for command execution
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// History error
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Retime failed
    #[error(transparent)]
    Retime(#[from] RetimeFailure),

    /// Track not found
    #[error("Track not found: {0:?}")]
    TrackNotFound(TrackId),

    /// No track with this name
    #[error("Unknown track: {0}")]
    UnknownTrack(String),

    /// No preset with this label
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Engine rejected an input outside a retime invocation
    #[error(transparent)]
    Engine(#[from] RetimeError),
}

impl From<bincode::Error> for CommandError {
    fn from(err: bincode::Error) -> Self {
        Self::History(HistoryError::Serialization(err))
    }
}

/// Track with the given name, or the first track when no name is given
pub fn resolve_track(sequence: &Sequence, name: Option<&str>) -> Result<TrackId, CommandError> {
    let track = match name {
        Some(name) => sequence.track_by_name(name),
        None => sequence.tracks().next(),
    };
    track
        .map(|t| t.id)
        .ok_or_else(|| CommandError::UnknownTrack(name.unwrap_or("<first>").to_string()))
}

/// Retime one track of a sequence
#[derive(Debug, Clone)]
pub struct RetimeCommand {
    /// Track to retime
    pub track: TrackId,
    /// Range override; the sequence selection is used when `None`
    pub range: Option<SelectionRange>,
    /// Retime parameters
    pub request: RetimeRequest,
    /// Description shown in the history
    pub description: String,
}

impl RetimeCommand {
    /// Create a new retime command over the sequence selection
    pub fn new(track: TrackId, request: RetimeRequest) -> Self {
        let description = match request.mode {
            RetimeMode::Absolute => format!("Retime {}f", request.delta),
            RetimeMode::Incremental => format!("Retime {:+}f", request.delta),
        };
        Self {
            track,
            range: None,
            request,
            description,
        }
    }

    /// Retime an explicit range instead of the selection
    pub fn with_range(mut self, range: SelectionRange) -> Self {
        self.range = Some(range);
        self
    }
}

impl SequenceCommand for RetimeCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn execute(&self, sequence: &mut Sequence) -> Result<RetimeOutcome, CommandError> {
        let Some(mut timeline) = sequence.timeline(self.track) else {
            return Err(CommandError::TrackNotFound(self.track));
        };

        let outcome = match self.range {
            Some(range) => Retimer::retime_range(&mut timeline, range, &self.request)?,
            None => Retimer::retime(&mut timeline, &self.request)?,
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordoplay_retime::Track;

    #[test]
    fn test_descriptions() {
        let id = TrackId::new();
        assert_eq!(RetimeCommand::new(id, RetimeRequest::absolute(3.0)).description(), "Retime 3f");
        assert_eq!(RetimeCommand::new(id, RetimeRequest::incremental(1.0)).description(), "Retime +1f");
        assert_eq!(RetimeCommand::new(id, RetimeRequest::incremental(-2.0)).description(), "Retime -2f");
    }

    #[test]
    fn test_execute_on_selection() {
        let mut sequence = Sequence::new("cmd");
        let id = sequence.add_track(Track::with_times("t", &[0.0, 2.0, 4.0]).unwrap());
        sequence.selection = SelectionRange::new(0.0, 4.0).unwrap();

        let outcome = RetimeCommand::new(id, RetimeRequest::absolute(3.0))
            .execute(&mut sequence)
            .unwrap();
        assert_eq!(outcome.schedule.targets(), &[0.0, 3.0, 6.0]);
        assert_eq!(sequence.track(id).unwrap().times(), vec![0.0, 3.0, 6.0]);
    }

    #[test]
    fn test_execute_with_range() {
        let mut sequence = Sequence::new("cmd");
        let id = sequence.add_track(Track::with_times("t", &[0.0, 2.0, 4.0]).unwrap());

        RetimeCommand::new(id, RetimeRequest::absolute(5.0))
            .with_range(SelectionRange::new(2.0, 2.0).unwrap())
            .execute(&mut sequence)
            .unwrap();
        assert_eq!(sequence.track(id).unwrap().times(), vec![0.0, 2.0, 7.0]);
    }

    #[test]
    fn test_resolve_track() {
        let mut sequence = Sequence::new("cmd");
        assert!(matches!(
            resolve_track(&sequence, None),
            Err(CommandError::UnknownTrack(name)) if name == "<first>"
        ));
        let first = sequence.add_track(Track::new("first"));
        let second = sequence.add_track(Track::new("second"));
        assert_eq!(resolve_track(&sequence, None).unwrap(), first);
        assert_eq!(resolve_track(&sequence, Some("second")).unwrap(), second);
    }

    #[test]
    fn test_missing_track() {
        let mut sequence = Sequence::new("cmd");
        let err = RetimeCommand::new(TrackId::new(), RetimeRequest::absolute(1.0))
            .execute(&mut sequence)
            .unwrap_err();
        assert!(matches!(err, CommandError::TrackNotFound(_)));
    }
}
