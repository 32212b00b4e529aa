//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and formatted tables for statistics and batch failures.

use crate::file_category::Classification;
use crate::file_organizer::{BatchReport, DirectoryEntry, Failure, Progress, Statistics};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for batch operations
/// - Statistics and failure tables
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("12 items moved");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for batch operations. The length is set when the batch
    /// starts.
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints the entry counts of a directory.
    ///
    /// Directories are shown in yellow and files without an extension in red.
    pub fn statistics_table(stats: &Statistics) {
        Self::header("STATISTICS");

        let mut rows: Vec<(String, usize, Color)> = Vec::new();
        if stats.directories > 0 {
            rows.push(("folders".to_string(), stats.directories, Color::Yellow));
        }
        for (extension, count) in &stats.extensions {
            rows.push((extension.clone(), *count, Color::White));
        }
        if stats.unknown > 0 {
            rows.push(("unknown".to_string(), stats.unknown, Color::Red));
        }

        let width = rows
            .iter()
            .map(|(label, _, _)| label.len())
            .max()
            .unwrap_or(0)
            .max(5); // At least "Total" width

        println!("{:<width$} | {}", "Entry".bold(), "Count".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (label, count, color) in &rows {
            println!(
                "{:<width$} | {}",
                label.color(*color),
                count.to_string().color(*color),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {}",
            "Total".bold(),
            stats.total.to_string().green().bold(),
            width = width
        );
    }

    /// Prints the entries returned by a scan.
    pub fn entry_list(entries: &[DirectoryEntry]) {
        if entries.is_empty() {
            Self::plain("No entries found.");
            return;
        }
        for entry in entries {
            if entry.is_dir() {
                println!(" - {}/", entry.name.yellow());
            } else {
                println!(" - {}", entry.name);
            }
        }
    }

    /// Prints where a file name would be sorted in category mode.
    pub fn classification(name: &str, classification: &Classification) {
        let target = classification.dir_components().join("/");
        if classification.is_unclassified() {
            println!("{} → {}", name, target.red());
        } else {
            println!("{} → {}", name, target.green());
        }
    }

    /// Prints the outcome of a batch: the success count, then every failure.
    pub fn batch_summary(verb: &str, report: &BatchReport) {
        let item_word = if report.success_count() == 1 { "item" } else { "items" };
        Self::success(&format!(
            "{} {} successfully {}",
            report.success_count(),
            item_word,
            verb
        ));
        Self::failure_table(&report.failures);
    }

    /// Prints a table of per-item failures, or a green note when there are none.
    pub fn failure_table(failures: &[Failure]) {
        if failures.is_empty() {
            println!("{}", "No errors occurred!".green());
            return;
        }

        Self::warning(&format!(
            "{} {} failed",
            failures.len(),
            if failures.len() == 1 { "item" } else { "items" }
        ));

        let width = failures
            .iter()
            .map(|failure| failure.item.len())
            .max()
            .unwrap_or(0)
            .max(9); // At least "Item name" width

        println!("{:<width$} | {}", "Item name".red().bold(), "Error message".red().bold(), width = width);
        println!("{}", "-".repeat(width + 16));
        for failure in failures {
            println!(
                "{:<width$} | {}",
                failure.item.red(),
                failure.reason().red(),
                width = width
            );
        }
    }
}

impl Progress for ProgressBar {
    fn start(&self, total: usize) {
        self.set_length(total as u64);
        self.set_position(0);
    }

    fn advance(&self, item: &str) {
        self.set_message(item.to_string());
        self.inc(1);
    }

    fn finish(&self) {
        self.finish_and_clear();
    }
}
