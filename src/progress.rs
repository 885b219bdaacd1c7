//! Progress reporting for the traversal
//!
//! Provides real-time progress display using indicatif progress bars.

use crate::engine::TraverseProgress;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays traversal status
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &TraverseProgress) {
        let bytes_str = format_size(progress.bytes, BINARY);
        let rate = progress.files_per_second();

        let msg = format!(
            "Dirs: {} | Files: {} | Processed: {} | Size: {} | Rate: {:.0}/s",
            format_number(progress.dirs),
            format_number(progress.files),
            format_number(progress.processed),
            bytes_str,
            rate,
        );

        self.bar.set_message(msg);
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the traversal results
pub fn print_summary(
    dirs: u64,
    files: u64,
    processed: u64,
    bytes: u64,
    errors: u64,
    duration: Duration,
) {
    let bytes_str = format_size(bytes, BINARY);
    let duration_secs = duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        processed as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    println!("{}", style("Traversal Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Folders:").bold(), format_number(dirs));
    println!("  {} {}", style("Files:").bold(), format_number(files));
    println!("  {} {}", style("Processed:").bold(), format_number(processed));
    println!("  {} {}", style("Total Size:").bold(), bytes_str);
    println!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(errors)
        );
    }
    println!();
}

/// Print a header at the start of the traversal
pub fn print_header(folder_id: &str, workers: usize, expanders: usize) {
    println!();
    println!(
        "{} {}",
        style("drive-walker").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Folder:").bold(), folder_id);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} {}", style("Expanders:").bold(), expanders);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }
}
