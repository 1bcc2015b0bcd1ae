//! Human-readable output formatter with colors and styling.

use super::formatter::ContainmentCheck;
use super::formatter::OutputFormatter;
use super::formatter::PackageCheck;
use anyhow::Result;
use cdnsync_core::BatchReport;
use cdnsync_core::ImportReport;
use cdnsync_core::VersionOutcome;
use console::Term;
use console::style;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    /// Prefixes `text` with a pass/fail mark.
    fn status_line(&self, ok: bool, text: &str) {
        if self.use_colors {
            let mark = if ok {
                style("✓").green().bold()
            } else {
                style("✗").red().bold()
            };
            self.line(&format!("{mark} {text}"));
        } else if ok {
            self.line(&format!("OK {text}"));
        } else {
            self.line(&format!("FAIL {text}"));
        }
    }

    fn heading(&self, text: &str) {
        if self.use_colors {
            self.line(&format!("{}", style(text).yellow().bold()));
        } else {
            self.line(text);
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_check_results(&self, results: &[PackageCheck]) -> Result<()> {
        for result in results {
            // Rejections are shown even in quiet mode.
            if self.quiet && result.valid {
                continue;
            }
            self.status_line(
                result.valid,
                &format!("{} ({})", result.path, result.library),
            );
            for error in &result.errors {
                self.line(&format!("    {error}"));
            }
            for violation in &result.violations {
                self.line(&format!("    [{}] {}", violation.kind, violation.message));
            }
            if !self.quiet {
                for lint in &result.lints {
                    self.line(&format!("    warning: {lint}"));
                }
            }
        }
        Ok(())
    }

    fn format_containment(&self, result: &ContainmentCheck) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.verbose || result.candidates.len() > 1 {
            for candidate in &result.candidates {
                self.status_line(candidate.contained, &candidate.path);
            }
        }
        let verdict = if result.contained {
            "contained"
        } else {
            "escapes"
        };
        self.status_line(result.contained, &format!("{verdict}: {}", result.root));
        Ok(())
    }

    fn format_import_result(
        &self,
        library: &str,
        version: &str,
        report: &ImportReport,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.status_line(
            !report.has_violations(),
            &format!("Imported {library}@{version}"),
        );
        self.line(&format!("  Files copied:  {}", report.files_copied));
        self.line(&format!("  Files skipped: {}", report.files_skipped));
        if report.version_bumped {
            self.line(&format!("  Latest version is now {version}"));
        }

        if !report.missing_patterns.is_empty() {
            self.line("");
            self.heading("Patterns with no match:");
            for pattern in &report.missing_patterns {
                self.line(&format!("  - {pattern}"));
            }
        }

        if report.has_violations() {
            self.line("");
            self.heading("Violations:");
            for violation in &report.violations {
                self.line(&format!("  - [{}] {}", violation.kind, violation.message));
            }
        }

        Ok(())
    }

    fn format_update_result(&self, report: &BatchReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.status_line(
            report.violation_count() == 0,
            &format!(
                "Auto Update Completed - {} versions were updated",
                Self::format_number(report.new_versions)
            ),
        );
        self.line(&format!(
            "  Libraries:  {}",
            Self::format_number(report.libraries.len())
        ));
        self.line(&format!(
            "  Violations: {}",
            Self::format_number(report.violation_count())
        ));
        if self.verbose {
            self.line(&format!("  Duration:   {:?}", report.duration));
        }

        for library in &report.libraries {
            if let Some(reason) = &library.skipped {
                self.line(&format!("  {} skipped: {reason}", library.name));
            }
            for (version, outcome) in &library.versions {
                match outcome {
                    VersionOutcome::Imported(import) if import.updated || self.verbose => {
                        self.line(&format!(
                            "  {}@{version}: {} files",
                            library.name, import.files_copied
                        ));
                    }
                    VersionOutcome::Failed(error) => {
                        self.line(&format!("  {}@{version} failed: {error}", library.name));
                    }
                    VersionOutcome::NotFound if self.verbose => {
                        self.line(&format!("  {}@{version}: not found", library.name));
                    }
                    _ => {}
                }
            }
            for violation in library.all_violations() {
                self.line(&format!("    [{}] {}", violation.kind, violation.message));
            }
        }

        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_small() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(42), "42");
        assert_eq!(HumanFormatter::format_number(999), "999");
    }

    #[test]
    fn test_format_number_thousands() {
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }
}
