//! `vba-sync push`: make the document match the source tree.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use vbasync_core::container::DocumentConnector;
use vbasync_sync::pipeline::{self, PushScope};
use vbasync_watch::paths::DEFAULT_SOURCE_DIR;

use super::{print_outcomes, print_session_note};

/// Arguments for `vba-sync push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Document to update.
    pub document: PathBuf,

    /// Source tree to read modules from.
    #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
    pub source_dir: PathBuf,

    /// Show what would change without touching the document.
    #[arg(long)]
    pub dry_run: bool,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let result = pipeline::push(
            &DocumentConnector,
            &self.document,
            PushScope::Tree(self.source_dir.clone()),
            self.dry_run,
        )
        .with_context(|| format!("push into {} failed", self.document.display()))?;

        let report = &result.report;
        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        println!(
            "{prefix}{} {} → {} ({} applied, {} skipped, {} failed)",
            "✓".green(),
            self.source_dir.display(),
            self.document.display(),
            report.applied(),
            report.skipped(),
            report.failed()
        );
        print_outcomes(report);
        print_session_note(result.session, report.has_changes());

        if report.failed() > 0 {
            bail!("{} module(s) could not be pushed", report.failed());
        }
        Ok(())
    }
}
