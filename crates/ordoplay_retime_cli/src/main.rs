// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` keyframe retiming tool.
//!
//! Command-line host for the retiming engine:
//! - Retime a track of a sequence file by preset or explicit delta
//! - Preview the target times without writing
//! - Run batch scripts with undo/redo
//!
//! ## Architecture
//!
//! Every retime runs inside a [`session::RetimeSession`], which records the
//! whole invocation as a single undo step, the way the editor brackets edits.

mod app;
mod batch;
mod cli;
mod commands;
mod history;
mod session;
mod settings;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let cli = cli::Cli::parse();

    // `presets --init` may be creating the file it is pointed at
    let loaded = match (&cli.command, cli.config.as_deref()) {
        (cli::Command::Presets(args), Some(path)) if args.init && !path.exists() => {
            Ok(settings::RetimeSettings::default())
        }
        (_, path) => settings::RetimeSettings::load_or_default(path),
    };
    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ordoplay-retime: {e}");
            std::process::exit(2);
        }
    };

    // RUST_LOG wins over the settings file
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting OrdoPlay retime v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = app::run(cli, &settings) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
