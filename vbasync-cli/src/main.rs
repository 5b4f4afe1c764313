//! vba-sync: keep a document's VBA code in step with a source tree.
//!
//! # Usage
//!
//! ```text
//! vba-sync pull  <document> [--output-dir DIR]
//! vba-sync push  <document> [--source-dir DIR] [--dry-run]
//! vba-sync watch <document> [--source-dir DIR]
//! vba-sync diff  <document> [--source-dir DIR]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, pull::PullArgs, push::PushArgs, watch::WatchArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "vba-sync",
    version,
    about = "Synchronize VBA code between a document and a source tree",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export every module of the document into the source tree.
    Pull(PullArgs),

    /// Make the document's modules match the source tree.
    Push(PushArgs),

    /// Push every change in the source tree as it happens.
    Watch(WatchArgs),

    /// Show how the source tree differs from the document.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    vbasync_watch::init_tracing();
    match cli.command {
        Commands::Pull(args) => args.run(),
        Commands::Push(args) => args.run(),
        Commands::Watch(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}
