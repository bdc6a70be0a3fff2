// SPDX-License-Identifier: MIT OR Apache-2.0
//! Batch scripts: a list of retime, selection and undo/redo steps in RON.

use crate::commands::{CommandError, RetimeCommand};
use crate::session::RetimeSession;
use crate::settings::RetimeSettings;
use ordoplay_retime::{RetimeRequest, SelectionRange};
use serde::{Deserialize, Serialize};

/// One step of a batch script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchStep {
    /// Replace the selection
    Select(SelectionRange),
    /// Run a preset from the settings
    Preset {
        /// Preset label
        label: String,
        /// Range override
        #[serde(default)]
        range: Option<SelectionRange>,
    },
    /// Run an explicit request
    Retime {
        /// Retime parameters
        request: RetimeRequest,
        /// Range override
        #[serde(default)]
        range: Option<SelectionRange>,
    },
    /// Undo the last step
    Undo,
    /// Redo the last undone step
    Redo,
}

/// A batch script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchScript {
    /// Track to retime; the first track when omitted
    #[serde(default)]
    pub track: Option<String>,
    /// Steps in order
    pub steps: Vec<BatchStep>,
}

impl BatchScript {
    /// Parse a script from RON
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}

/// What a script run did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Retime steps that succeeded
    pub retimes: usize,
    /// Undo steps
    pub undos: usize,
    /// Redo steps
    pub redos: usize,
    /// Keys moved across all retimes
    pub keys_moved: usize,
}

/// Run every step of `script` against `session`, stopping at the first error
pub fn run_script(
    session: &mut RetimeSession,
    script: &BatchScript,
    settings: &RetimeSettings,
) -> Result<BatchSummary, CommandError> {
    let track = session.resolve_track(script.track.as_deref())?;
    let mut summary = BatchSummary::default();

    for (index, step) in script.steps.iter().enumerate() {
        tracing::debug!("Batch step {}: {:?}", index + 1, step);

        let (request, range) = match step {
            BatchStep::Select(range) => {
                session.select(SelectionRange::new(range.start, range.end)?);
                continue;
            }
            BatchStep::Undo => {
                session.undo()?;
                summary.undos += 1;
                continue;
            }
            BatchStep::Redo => {
                session.redo()?;
                summary.redos += 1;
                continue;
            }
            BatchStep::Preset { label, range } => {
                let preset = settings
                    .preset(label)
                    .ok_or_else(|| CommandError::UnknownPreset(label.clone()))?;
                (preset.request(settings.move_to_next), *range)
            }
            BatchStep::Retime { request, range } => (*request, *range),
        };

        let mut command = RetimeCommand::new(track, request);
        if let Some(range) = range {
            command = command.with_range(range);
        }
        let outcome = session.execute(&command)?;
        summary.retimes += 1;
        summary.keys_moved += outcome.moved_count();
    }

    tracing::info!(
        "Batch finished: {} retimes, {} undos, {} redos",
        summary.retimes,
        summary.undos,
        summary.redos
    );
    Ok(summary)
}
