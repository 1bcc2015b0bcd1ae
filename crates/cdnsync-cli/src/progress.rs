//! Progress bar implementation for batch updates.

use cdnsync_core::BatchReport;
use cdnsync_core::LibraryReport;
use cdnsync_core::report::UpdateProgress;
use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressState;
use indicatif::ProgressStyle;
use std::fmt::Write;

/// CLI progress bar wrapper implementing `UpdateProgress`.
///
/// Shows the number of processed libraries, the library most recently
/// started and the elapsed time. Libraries that gained versions are printed
/// above the bar. Automatically cleans up on drop.
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a new progress bar over `total` libraries.
    #[must_use]
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);

        // Template: "Updating [████████░░░░] 42/100 libraries (1m5s) jquery"
        bar.set_style(
            ProgressStyle::default_bar()
                .template("Updating [{bar:40.cyan/blue}] {pos}/{len} libraries ({took}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .with_key("took", |state: &ProgressState, w: &mut dyn Write| {
                    write!(w, "{}", humanize_duration(state.elapsed())).unwrap_or(());
                })
                .progress_chars("█▓░"),
        );

        Self { bar }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl UpdateProgress for CliProgress {
    fn on_library_start(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_library_complete(&self, report: &LibraryReport) {
        let new_versions = report.new_versions();
        if new_versions > 0 {
            self.bar.println(format!("  {} +{new_versions}", report.name));
        }
        self.bar.inc(1);
    }

    fn on_complete(&self, _report: &BatchReport) {
        self.bar.finish_and_clear();
    }
}

/// Converts duration to human-readable format.
fn humanize_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
