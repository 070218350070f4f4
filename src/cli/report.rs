//! Human-readable output for command results.

use colored::Colorize;

use crate::core::collector::PullReport;
use crate::core::diff::DifferenceSet;
use crate::core::record::CollectStats;
use crate::core::remote::BatchOutcome;
use crate::core::store::WriteAction;

pub fn print_collect_stats(stats: &CollectStats, verbose: bool) {
    println!(
        "{} {} record(s) from {} file(s), {} duplicate(s) dropped, {} unresolved",
        "collected:".bold().green(),
        stats.records_found,
        stats.files_scanned,
        stats.duplicates_dropped,
        stats.unresolved_dropped
    );
    if verbose {
        for phase in &stats.phases {
            println!(
                "  {:<18} {:>6.1?}  files={} records={}",
                phase.phase.to_string(),
                phase.elapsed,
                phase.files_scanned,
                phase.records_found
            );
        }
    }
}

pub fn print_diff(diff: &DifferenceSet) {
    println!(
        "{} {} new, {} updated, {} deleted, {} unchanged",
        "diff:".bold(),
        diff.new.len().to_string().green(),
        diff.updated.len().to_string().yellow(),
        diff.deleted.len().to_string().red(),
        diff.unchanged.len()
    );
    for record in &diff.new {
        println!("  {} {}", "+".green(), record.key);
    }
    for record in &diff.updated {
        println!("  {} {}", "~".yellow(), record.key);
    }
    for record in &diff.deleted {
        println!("  {} {}", "-".red(), record.key);
    }
}

pub fn print_batch_outcomes(outcomes: &[BatchOutcome]) {
    let failed = outcomes.iter().filter(|o| !o.success).count();
    println!(
        "{} {} batch(es) uploaded, {} failed",
        "push:".bold(),
        outcomes.len() - failed,
        failed
    );
    for outcome in outcomes.iter().filter(|o| !o.success) {
        println!(
            "  {} batch {}: {}",
            "failed".red(),
            outcome.batch_index,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
}

pub fn print_pull_reports(reports: &[PullReport]) {
    for report in reports {
        if report.previewed > 0 {
            println!(
                "{} {}: {} key(s) would be written, {} skipped",
                "pull:".bold(),
                report.language,
                report.previewed,
                report.skipped
            );
        } else {
            println!(
                "{} {}: {} key(s) written, {} skipped",
                "pull:".bold(),
                report.language,
                report.written,
                report.skipped
            );
        }
        for outcome in &report.outcomes {
            let verb = match outcome.action {
                WriteAction::Written => "wrote".green(),
                WriteAction::Declined => "declined".yellow(),
                WriteAction::Previewed => "would write".cyan(),
            };
            println!("  {} {}", verb, outcome.path.display());
        }
        for error in &report.errors {
            println!("  {} {}", "error:".bold().red(), error);
        }
    }
}
