// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments.

use crate::commands::CommandError;
use crate::settings::RetimeSettings;
use clap::{Args, Parser, Subcommand};
use ordoplay_retime::{RetimeRequest, SelectionRange};
use std::path::PathBuf;

/// Retime keyframes in OrdoPlay sequence files
#[derive(Debug, Parser)]
#[command(name = "ordoplay-retime", version, about)]
pub struct Cli {
    /// Settings file (defaults to ./retime.ron when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Retime a track and write the sequence back
    Retime(RetimeArgs),
    /// Print the target times a retime would apply, without writing
    Preview(PreviewArgs),
    /// Run a RON script of retime, select, undo and redo steps
    Batch(BatchArgs),
    /// List the configured presets
    Presets(PresetsArgs),
}

/// Which sequence, track and range to work on
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Sequence file (RON)
    pub sequence: PathBuf,

    /// Track name; the first track when omitted
    #[arg(long)]
    pub track: Option<String>,

    /// Range to retime instead of the selection stored in the sequence
    #[arg(long, num_args = 2, value_names = ["START", "END"], allow_hyphen_values = true)]
    pub range: Option<Vec<f64>>,
}

impl TargetArgs {
    /// The `--range` override, validated
    pub fn range(&self) -> Result<Option<SelectionRange>, CommandError> {
        match self.range.as_deref() {
            Some(&[start, end]) => Ok(Some(SelectionRange::new(start, end)?)),
            _ => Ok(None),
        }
    }
}

/// How to retime
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Preset label, e.g. `3f` or `-1f`
    #[arg(long, conflicts_with = "delta", allow_hyphen_values = true)]
    pub preset: Option<String>,

    /// Delta in frames
    #[arg(long, allow_hyphen_values = true, required_unless_present = "preset")]
    pub delta: Option<f64>,

    /// Add the delta to every gap instead of replacing the gap
    #[arg(long, requires = "delta")]
    pub incremental: bool,

    /// Move the playhead to the key after the start key when done
    #[arg(long)]
    pub move_to_next: bool,
}

impl RequestArgs {
    /// Build the request, looking presets up in `settings`
    pub fn request(&self, settings: &RetimeSettings) -> Result<RetimeRequest, CommandError> {
        let reposition = self.move_to_next || settings.move_to_next;

        if let Some(label) = &self.preset {
            let preset = settings
                .preset(label)
                .ok_or_else(|| CommandError::UnknownPreset(label.clone()))?;
            return Ok(preset.request(reposition));
        }

        let delta = self.delta.unwrap_or_default();
        let request = if self.incremental {
            RetimeRequest::incremental(delta)
        } else {
            RetimeRequest::absolute(delta)
        };
        Ok(request.with_reposition(reposition))
    }
}

/// Arguments of `retime`
#[derive(Debug, Args)]
pub struct RetimeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub request: RequestArgs,

    /// Write the result here instead of overwriting the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `preview`
#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub request: RequestArgs,

    /// Print the preview as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `batch`
#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Sequence file (RON)
    pub sequence: PathBuf,

    /// Batch script (RON)
    pub script: PathBuf,

    /// Write the result here instead of overwriting the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments of `presets`
#[derive(Debug, Args)]
pub struct PresetsArgs {
    /// Write the effective settings to the settings file
    #[arg(long)]
    pub init: bool,
}
