use colored::Colorize;

use crate::core::models::batch_report::BatchReport;
use crate::core::models::run_settings::SyncMode;

/// Print a success message.
pub fn success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a header line.
pub fn header(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Print the end-of-batch summary.
pub fn batch_summary(mode: SyncMode, report: &BatchReport) {
    let verb = match mode {
        SyncMode::Upload => "uploaded",
        SyncMode::Download => "downloaded",
    };
    success(&format!(
        "{} {} file{}",
        report.transferred,
        verb,
        if report.transferred == 1 { "" } else { "s" }
    ));
    if report.skipped > 0 {
        warning(&format!(
            "{} encrypted object{} skipped (run with --encrypt yes to fetch them)",
            report.skipped,
            if report.skipped == 1 { "" } else { "s" }
        ));
    }
}
