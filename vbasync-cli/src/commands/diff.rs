//! `vba-sync diff <document>`: show how the source tree differs from the
//! document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use vbasync_core::container::DocumentConnector;
use vbasync_sync::{pipeline, ArtifactDiff};
use vbasync_watch::paths::DEFAULT_SOURCE_DIR;

/// Arguments for `vba-sync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Document to compare against.
    pub document: PathBuf,

    /// Source tree to compare.
    #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
    pub source_dir: PathBuf,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let diffs = pipeline::diff(&DocumentConnector, &self.document, &self.source_dir)
            .with_context(|| format!("diff against {} failed", self.document.display()))?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            match diff {
                ArtifactDiff::Changed { unified_diff, .. } => {
                    print!("{unified_diff}");
                    if !unified_diff.ends_with('\n') {
                        println!();
                    }
                }
                ArtifactDiff::New { path } => {
                    println!("{} new file {}", "+".green(), path.display())
                }
                ArtifactDiff::Removed { name } => {
                    println!("{} '{name}' has no file and would be removed", "-".red())
                }
                ArtifactDiff::Unreadable { path, error } => {
                    println!("{} {}: {error}", "!".yellow(), path.display())
                }
            }
        }
        Ok(())
    }
}
