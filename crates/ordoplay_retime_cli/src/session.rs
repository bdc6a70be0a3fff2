// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session: a sequence plus its undo history.
//!
//! The session is the undo bracket around the engine. One command becomes one
//! history entry no matter how many keys it renames.

use crate::commands::{self, CommandError, SequenceCommand};
use crate::history::{History, HistoryStats, Operation, StateSnapshot};
use ordoplay_retime::{RetimeOutcome, SelectionRange, Sequence, TrackId};

/// A sequence being edited, with undo/redo
pub struct RetimeSession {
    sequence: Sequence,
    history: History,
}

impl RetimeSession {
    /// Start a session on `sequence`
    pub fn new(sequence: Sequence, history_depth: usize) -> Self {
        Self {
            sequence,
            history: History::with_max_depth(history_depth),
        }
    }

    /// The sequence in its current state
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// End the session, keeping the edited sequence
    pub fn into_sequence(self) -> Sequence {
        self.sequence
    }

    /// Replace the playback-range selection
    pub fn select(&mut self, range: SelectionRange) {
        self.sequence.selection = range;
    }

    /// Track with the given name, or the first track when no name is given
    pub fn resolve_track(&self, name: Option<&str>) -> Result<TrackId, CommandError> {
        commands::resolve_track(&self.sequence, name)
    }

    /// Run a command and record it as one undo step.
    ///
    /// A command that fails after changing the sequence is still recorded, so
    /// the partial result can be undone.
    pub fn execute<C: SequenceCommand>(&mut self, command: &C) -> Result<RetimeOutcome, CommandError> {
        let before = StateSnapshot::from_value(&self.sequence)?;

        match command.execute(&mut self.sequence) {
            Ok(outcome) => {
                self.record(command.description().to_string(), before)?;
                Ok(outcome)
            }
            Err(err) => {
                let after = StateSnapshot::from_value(&self.sequence)?;
                if after.data != before.data {
                    tracing::warn!("{} left a partial result; recording it for undo", command.description());
                    self.record(format!("{} (partial)", command.description()), before)?;
                }
                Err(err)
            }
        }
    }

    /// Undo the last command, returning its description
    pub fn undo(&mut self) -> Result<String, CommandError> {
        let operation = self.history.undo()?;
        self.sequence = operation.before.to_value()?;
        tracing::debug!("Undo: {}", operation.description);
        Ok(operation.description)
    }

    /// Redo the last undone command, returning its description
    pub fn redo(&mut self) -> Result<String, CommandError> {
        let operation = self.history.redo()?;
        self.sequence = operation.after.to_value()?;
        tracing::debug!("Redo: {}", operation.description);
        Ok(operation.description)
    }

    /// Undo/redo statistics
    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    fn record(&mut self, description: String, before: StateSnapshot) -> Result<(), CommandError> {
        let id = self.history.begin_operation();
        let after = StateSnapshot::from_value(&self.sequence)?;
        tracing::debug!("Recorded operation {}: {}", id.value(), description);
        self.history.commit(Operation::new(id, description, before, after));
        Ok(())
    }
}
