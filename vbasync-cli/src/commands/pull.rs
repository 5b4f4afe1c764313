//! `vba-sync pull`: export the document's modules into a source tree.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use vbasync_core::container::DocumentConnector;
use vbasync_sync::{pipeline, ExportOutcome};
use vbasync_watch::paths::DEFAULT_SOURCE_DIR;

/// Arguments for `vba-sync pull`.
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Document to export from.
    pub document: PathBuf,

    /// Directory the modules are written to.
    #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
    pub output_dir: PathBuf,
}

impl PullArgs {
    pub fn run(self) -> Result<()> {
        let result = pipeline::pull(&DocumentConnector, &self.document, &self.output_dir)
            .with_context(|| format!("pull from {} failed", self.document.display()))?;
        let report = result.report;

        if !report.has_project {
            println!(
                "{} {} has no VBA project; nothing exported.",
                "!".yellow(),
                self.document.display()
            );
            return Ok(());
        }

        println!(
            "{} {} → {} ({} exported, {} failed)",
            "✓".green(),
            self.document.display(),
            self.output_dir.display(),
            report.exported(),
            report.failed()
        );
        for outcome in &report.outcomes {
            let marker = match outcome {
                ExportOutcome::Exported { .. } => "✎".green(),
                ExportOutcome::Unconverted { .. } => "!".yellow(),
                ExportOutcome::Failed { .. } => "✗".red().bold(),
            };
            println!("  {marker}  {outcome}");
        }

        if report.failed() > 0 {
            bail!("{} module(s) could not be exported", report.failed());
        }
        Ok(())
    }
}
