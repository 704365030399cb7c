use colored::Colorize;
use std::path::Path;

use crate::driver::BatchReport;

/// Renders a batch report for the terminal.
pub struct Reporter {
    color: bool,
    dry_run: bool,
}

impl Reporter {
    pub fn new(color: bool, dry_run: bool) -> Self {
        Reporter { color, dry_run }
    }

    pub fn render(&self, report: &BatchReport) -> String {
        let mut out = String::new();
        let verb = if self.dry_run { "would rewrite" } else { "rewrote" };
        for path in &report.rewritten {
            out.push_str(&self.format_line(verb, path, None));
            out.push('\n');
        }
        for skipped in &report.skipped {
            out.push_str(&self.format_line("skipped", &skipped.path, Some(&skipped.reason)));
            out.push('\n');
        }
        out.push_str(&self.format_summary(report));
        out
    }

    fn format_line(&self, label: &str, path: &Path, detail: Option<&str>) -> String {
        let label = if !self.color {
            label.to_string()
        } else if label == "skipped" {
            label.yellow().bold().to_string()
        } else {
            label.green().bold().to_string()
        };
        match detail {
            Some(detail) => format!("{label} {}: {detail}", path.display()),
            None => format!("{label} {}", path.display()),
        }
    }

    fn format_summary(&self, report: &BatchReport) -> String {
        let changed = if self.dry_run { "would change" } else { "changed" };
        let mut summary = format!(
            "{} files scanned, {} {changed}, {} unchanged",
            report.discovered,
            report.rewritten.len(),
            report.unchanged.len()
        );
        if !report.skipped.is_empty() {
            summary.push_str(&format!(", {} skipped", report.skipped.len()));
        }
        if report.stats.changed() {
            summary.push_str(&format!(" ({})", report.stats));
        }
        if self.color {
            summary.bold().to_string()
        } else {
            summary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SkippedFile;
    use std::path::PathBuf;
    use zodify_core::Rule;

    #[test]
    fn test_render_plain() {
        let mut report = BatchReport {
            discovered: 3,
            rewritten: vec![PathBuf::from("src/a.ts")],
            unchanged: vec![PathBuf::from("src/b.ts")],
            skipped: vec![SkippedFile {
                path: PathBuf::from("src/c.ts"),
                reason: "src/c.ts:1:7: syntax error: Expected ident".to_string(),
            }],
            ..BatchReport::default()
        };
        report.stats.record(Rule::SourceImport);

        let out = Reporter::new(false, false).render(&report);
        assert_eq!(
            out,
            "rewrote src/a.ts\n\
             skipped src/c.ts: src/c.ts:1:7: syntax error: Expected ident\n\
             3 files scanned, 1 changed, 1 unchanged, 1 skipped (source-import=1)"
        );
    }

    #[test]
    fn test_render_dry_run() {
        let report = BatchReport {
            discovered: 1,
            rewritten: vec![PathBuf::from("a.ts")],
            ..BatchReport::default()
        };
        let out = Reporter::new(false, true).render(&report);
        assert!(out.starts_with("would rewrite a.ts\n"));
        assert!(out.ends_with("1 files scanned, 1 would change, 0 unchanged"));
    }
}
