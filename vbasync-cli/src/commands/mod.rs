pub mod diff;
pub mod pull;
pub mod push;
pub mod watch;

use colored::Colorize;
use vbasync_core::SessionClose;
use vbasync_sync::{ActionOutcome, ApplyReport};

/// One line per outcome, prefixed with a marker.
pub(crate) fn print_outcomes(report: &ApplyReport) {
    for outcome in &report.outcomes {
        let marker = match outcome {
            ActionOutcome::Updated { .. } => "✎".green(),
            ActionOutcome::Imported { .. } => "+".green(),
            ActionOutcome::Removed { .. } => "-".yellow(),
            ActionOutcome::WouldApply(_) => "~".cyan(),
            ActionOutcome::Skipped(_) => "·".bright_black(),
            ActionOutcome::Failed { .. } => "✗".red().bold(),
        };
        println!("  {marker}  {outcome}");
    }
}

/// What happened to the document after the command.
pub(crate) fn print_session_note(session: SessionClose, changed: bool) {
    match session {
        SessionClose::Saved => println!("{}", "Document saved.".green()),
        SessionClose::Discarded => {}
        SessionClose::LeftOpen if changed => println!(
            "{}",
            concat!(
                "Document is open elsewhere: changes are live but not saved. ",
                "Save it there to keep them."
            )
            .yellow()
        ),
        SessionClose::LeftOpen => {}
    }
}
