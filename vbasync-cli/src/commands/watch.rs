//! `vba-sync watch`: push source changes into the document as they happen.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use vbasync_core::container::DocumentConnector;
use vbasync_watch::{paths::DEFAULT_SOURCE_DIR, start_blocking, WatchConfig};

/// Arguments for `vba-sync watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Document to keep up to date.
    pub document: PathBuf,

    /// Source tree to watch.
    #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
    pub source_dir: PathBuf,
}

impl WatchArgs {
    pub fn run(self) -> Result<()> {
        println!(
            "Watching {} for changes to push into {} (ctrl-c to stop).",
            self.source_dir.display(),
            self.document.display()
        );
        let config = WatchConfig {
            document: self.document,
            source_dir: self.source_dir,
        };
        let summary = start_blocking(DocumentConnector, config).context("watch exited with error")?;
        println!(
            "Stopped: {} change(s) pushed, {} without effect, {} failed.",
            summary.processed - summary.unchanged,
            summary.unchanged,
            summary.failed
        );
        Ok(())
    }
}
