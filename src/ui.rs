//! Terminal output formatting.
//!
//! Pure display functions: status and result lines for the release phases
//! and the push-result summaries the finalize phase logs.

use crate::git::PushSummary;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display the result of one push invocation.
///
/// Logs the remote URL, the branch involved, every ref update reported by
/// the server, and any server messages.
///
/// # Arguments
/// * `label` - What was pushed ("branch", "tags")
/// * `branch` - The branch the push belongs to
/// * `summary` - The recorded push result
pub fn display_push_summary(label: &str, branch: &str, summary: &PushSummary) {
    println!(
        "{} Pushed {} to {} (branch {})",
        style("✓").green(),
        label,
        summary.remote_url,
        branch
    );

    for (refname, status) in &summary.ref_updates {
        match status {
            None => println!("    {} {}", style("updated").green(), refname),
            Some(reason) => println!("    {} {}: {}", style("rejected").red(), refname, reason),
        }
    }

    for message in &summary.messages {
        let trimmed = message.trim();
        if !trimmed.is_empty() {
            println!("    remote: {}", trimmed);
        }
    }
}
