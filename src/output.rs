//! CLI output formatting.
//!
//! Each command has a `format_*` function that returns lines (pure, easy to
//! test) and, where it is printed in more than one place, a `print_*`
//! wrapper that writes them to stdout.
//!
//! ## Batch rewrite
//!
//! ```text
//! rewritten  site/index.html
//! unchanged  site/about.html
//! failed     site/broken.html: IO error on site/broken.html: ...
//!
//! 1 rewritten, 1 unchanged, 1 failed
//! ```
//!
//! ## Check
//!
//! ```text
//! Redirect:        enabled
//! Production URL:  https://example.com
//! Site URL:        http://example.local
//! Status:          active
//! ```

use crate::batch::{BatchStats, FileOutcome, FileStatus};
use crate::config::RedirectorConfig;
use crate::hooks::Hook;

/// Placeholder shown for empty settings.
const NOT_SET: &str = "(not set)";

fn or_not_set(value: &str) -> &str {
    if value.is_empty() { NOT_SET } else { value }
}

/// Left-align `label` in a fixed-width column.
fn labelled(label: &str, value: &str) -> String {
    format!("{:<17}{}", format!("{label}:"), value)
}

// ============================================================================
// Batch rewrite
// ============================================================================

fn status_word(status: &FileStatus, dry_run: bool) -> &'static str {
    match status {
        FileStatus::Unchanged => "unchanged",
        FileStatus::Rewritten if dry_run => "would rewrite",
        FileStatus::Rewritten => "rewritten",
        FileStatus::Failed(_) => "failed",
    }
}

/// One line per file, then a blank line and the totals.
pub fn format_batch_report(outcomes: &[FileOutcome], dry_run: bool) -> Vec<String> {
    let mut lines: Vec<String> = outcomes
        .iter()
        .map(|outcome| {
            let word = status_word(&outcome.status, dry_run);
            match &outcome.status {
                FileStatus::Failed(err) => {
                    format!("{:<14} {}: {}", word, outcome.path.display(), err)
                }
                _ => format!("{:<14} {}", word, outcome.path.display()),
            }
        })
        .collect();

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let stats = BatchStats::from_outcomes(outcomes);
    if dry_run {
        lines.push(format!("{stats} (dry run, nothing written)"));
    } else {
        lines.push(stats.to_string());
    }
    lines
}

pub fn print_batch_report(outcomes: &[FileOutcome], dry_run: bool) {
    for line in format_batch_report(outcomes, dry_run) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Effective settings and whether they will rewrite anything.
pub fn format_check_output(config: &RedirectorConfig) -> Vec<String> {
    let status = if config.is_active() {
        "active".to_string()
    } else if !config.enable_redirect {
        "inactive (redirect disabled)".to_string()
    } else {
        "inactive (no production URL)".to_string()
    };

    vec![
        labelled(
            "Redirect",
            if config.enable_redirect { "enabled" } else { "disabled" },
        ),
        labelled("Production URL", or_not_set(&config.production_url)),
        labelled("Site URL", or_not_set(&config.site_url)),
        labelled("Status", &status),
    ]
}

// ============================================================================
// Hooks
// ============================================================================

/// Each extension point with the host event it answers and what it takes.
///
/// ```text
/// wp_get_attachment_url                  url
/// the_content                            content
/// ```
pub fn format_hooks() -> Vec<String> {
    Hook::ALL
        .iter()
        .map(|hook| format!("{:<38} {}", hook.event_name(), hook.kind()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchError;
    use std::path::PathBuf;

    fn outcome(path: &str, status: FileStatus) -> FileOutcome {
        FileOutcome {
            path: PathBuf::from(path),
            status,
        }
    }

    #[test]
    fn or_not_set_empty() {
        assert_eq!(or_not_set(""), "(not set)");
        assert_eq!(or_not_set("x"), "x");
    }

    #[test]
    fn labelled_aligns_values() {
        assert_eq!(labelled("Status", "active"), "Status:          active");
        assert_eq!(
            labelled("Production URL", "x"),
            "Production URL:  x"
        );
    }

    #[test]
    fn batch_report_lists_files_then_totals() {
        let outcomes = vec![
            outcome("site/index.html", FileStatus::Rewritten),
            outcome("site/about.html", FileStatus::Unchanged),
        ];
        let lines = format_batch_report(&outcomes, false);
        assert_eq!(
            lines,
            vec![
                "rewritten      site/index.html",
                "unchanged      site/about.html",
                "",
                "1 rewritten, 1 unchanged, 0 failed",
            ]
        );
    }

    #[test]
    fn batch_report_dry_run_wording() {
        let outcomes = vec![outcome("a.html", FileStatus::Rewritten)];
        let lines = format_batch_report(&outcomes, true);
        assert_eq!(lines[0], "would rewrite  a.html");
        assert!(lines.last().unwrap().ends_with("(dry run, nothing written)"));
    }

    #[test]
    fn batch_report_includes_error() {
        let outcomes = vec![outcome(
            "gone.html",
            FileStatus::Failed(BatchError::NotFound(PathBuf::from("gone.html"))),
        )];
        let lines = format_batch_report(&outcomes, false);
        assert_eq!(lines[0], "failed         gone.html: Path not found: gone.html");
    }

    #[test]
    fn batch_report_empty() {
        assert_eq!(
            format_batch_report(&[], false),
            vec!["0 rewritten, 0 unchanged, 0 failed"]
        );
    }

    #[test]
    fn check_output_active() {
        let config = RedirectorConfig {
            production_url: "https://prod.com".into(),
            enable_redirect: true,
            site_url: String::new(),
        };
        let lines = format_check_output(&config);
        assert_eq!(lines[0], "Redirect:        enabled");
        assert_eq!(lines[1], "Production URL:  https://prod.com");
        assert_eq!(lines[2], "Site URL:        (not set)");
        assert_eq!(lines[3], "Status:          active");
    }

    #[test]
    fn check_output_explains_inactive() {
        let disabled = RedirectorConfig {
            production_url: "https://prod.com".into(),
            ..Default::default()
        };
        assert!(format_check_output(&disabled)[3].ends_with("(redirect disabled)"));

        let no_url = RedirectorConfig {
            enable_redirect: true,
            ..Default::default()
        };
        assert!(format_check_output(&no_url)[3].ends_with("(no production URL)"));
    }

    #[test]
    fn hooks_listing_has_every_event() {
        let lines = format_hooks();
        assert_eq!(lines.len(), Hook::ALL.len());
        assert!(lines[0].starts_with("wp_get_attachment_url "));
        assert!(lines[0].ends_with(" url"));
        assert!(lines.iter().any(|l| l.starts_with("widget_text ")));
    }
}
