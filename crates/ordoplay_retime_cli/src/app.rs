// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand dispatch and reporting.

use crate::batch::{self, BatchScript};
use crate::cli::{BatchArgs, Cli, Command, PresetsArgs, PreviewArgs, RetimeArgs};
use crate::commands::{self, CommandError, RetimeCommand};
use crate::session::RetimeSession;
use crate::settings::{RetimeSettings, SettingsError, SETTINGS_FILE_NAME};
use ordoplay_retime::timeline::time_tolerance;
use ordoplay_retime::{RetimeOutcome, RetimeRequest, Retimer, SelectionRange, Sequence, SequenceError};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Application errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Command failed
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Sequence file error
    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    /// Settings file error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Script file could not be read
    #[error("Failed to read script {path}: {source}")]
    Script {
        /// Script path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Script file could not be parsed
    #[error("Failed to parse script: {0}")]
    ScriptParse(#[from] ron::error::SpannedError),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Preview of the times a retime would apply
#[derive(Debug, Serialize)]
struct PreviewReport {
    track: String,
    original: Vec<f64>,
    target: Vec<f64>,
    end: f64,
}

/// Run the parsed command line
pub fn run(cli: Cli, settings: &RetimeSettings) -> Result<(), CliError> {
    match cli.command {
        Command::Retime(args) => retime(args, settings),
        Command::Preview(args) => preview(args, settings),
        Command::Batch(args) => run_batch(args, settings),
        Command::Presets(args) => presets(args, cli.config.as_deref(), settings),
    }
}

fn presets(args: PresetsArgs, config: Option<&Path>, settings: &RetimeSettings) -> Result<(), CliError> {
    for preset in &settings.presets {
        println!("{:>6}  {:<11}  {:+}", preset.label, preset.mode, preset.delta);
    }
    if args.init {
        let path = config.unwrap_or(Path::new(SETTINGS_FILE_NAME));
        settings.save(path)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn retime(args: RetimeArgs, settings: &RetimeSettings) -> Result<(), CliError> {
    let sequence = Sequence::load(&args.target.sequence)?;
    let mut session = RetimeSession::new(sequence, settings.history_depth);

    let track = session.resolve_track(args.target.track.as_deref())?;
    let request = args.request.request(settings)?;
    let mut command = RetimeCommand::new(track, request);
    if let Some(range) = args.target.range()? {
        command = command.with_range(range);
    }

    let outcome = session.execute(&command)?;

    let output = args.output.unwrap_or(args.target.sequence);
    let sequence = session.into_sequence();
    sequence.save(&output)?;
    tracing::info!(
        "Wrote {} ({:.2}s of content)",
        output.display(),
        sequence.seconds(sequence.content_duration())
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn preview(args: PreviewArgs, settings: &RetimeSettings) -> Result<(), CliError> {
    let sequence = Sequence::load(&args.target.sequence)?;
    let request = args.request.request(settings)?;
    let range = args.target.range()?.unwrap_or(sequence.selection);
    let report = preview_report(&sequence, args.target.track.as_deref(), range, &request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} ({}, delta {})", report.track, request.mode, request.delta);
        for (original, target) in report.original.iter().zip(&report.target) {
            println!("  {original:>10} -> {target}");
        }
        println!("Last key ends at {}", report.end);
    }
    Ok(())
}

/// Pair each key from the start key on with its scheduled time
fn preview_report(
    sequence: &Sequence,
    track: Option<&str>,
    range: SelectionRange,
    request: &RetimeRequest,
) -> Result<PreviewReport, CommandError> {
    let track_id = commands::resolve_track(sequence, track)?;
    let track = sequence
        .track(track_id)
        .ok_or(CommandError::TrackNotFound(track_id))?;
    let schedule = Retimer::preview(track, range, request)?;

    let start = schedule.targets().first().copied().unwrap_or_default();
    let original = track
        .times()
        .into_iter()
        .skip_while(|&t| t < start - time_tolerance(start))
        .take(schedule.len())
        .collect();

    Ok(PreviewReport {
        track: track.name.clone(),
        original,
        target: schedule.targets().to_vec(),
        end: schedule.end(),
    })
}

fn run_batch(args: BatchArgs, settings: &RetimeSettings) -> Result<(), CliError> {
    let sequence = Sequence::load(&args.sequence)?;
    let text = std::fs::read_to_string(&args.script).map_err(|source| CliError::Script {
        path: args.script.clone(),
        source,
    })?;
    let script = BatchScript::from_ron(&text)?;

    let mut session = RetimeSession::new(sequence, settings.history_depth);
    let summary = batch::run_script(&mut session, &script, settings)?;

    let stats = session.history_stats();
    tracing::debug!(
        "History: {} undo, {} redo, {} bytes (depth {})",
        stats.undo_count,
        stats.redo_count,
        stats.memory_used,
        stats.max_depth
    );

    let output = args.output.unwrap_or(args.sequence);
    session.into_sequence().save(&output)?;
    tracing::info!("Wrote {}", output.display());

    println!(
        "{} retimes, {} undos, {} redos, {} keys moved",
        summary.retimes, summary.undos, summary.redos, summary.keys_moved
    );
    Ok(())
}

fn print_outcome(outcome: &RetimeOutcome) {
    let resolved = &outcome.resolved;
    println!(
        "Retimed {}..={} from key {} ({} moved, {} deferred)",
        resolved.range.start,
        resolved.range.end,
        resolved.start_keyframe,
        outcome.moved_count(),
        outcome.deferred_count()
    );
    for rename in outcome.renames.iter().filter(|r| r.from != r.to) {
        let note = if rename.deferred { " (deferred)" } else { "" };
        println!("  {:>10} -> {}{}", rename.from, rename.to, note);
    }
    println!("Playhead: {}", outcome.playhead);
}
