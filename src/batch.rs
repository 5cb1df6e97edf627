//! Rewrite HTML files on disk.
//!
//! Useful for static exports and cached pages: every `.html`/`.htm` file
//! under the given paths is run through the content hooks and written back
//! if anything changed.
//!
//! ## Parallel Processing
//!
//! Files are independent, so they are rewritten in parallel with
//! [rayon](https://docs.rs/rayon). One unreadable or unwritable file never
//! stops the others: its error is recorded in that file's [`FileOutcome`].

use crate::hooks::Redirector;
use crate::scanner::ContentScanner;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Path not found: {0}")]
    NotFound(PathBuf),
}

/// File extensions treated as HTML.
pub const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// What happened to one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
}

#[derive(Debug)]
pub enum FileStatus {
    /// Nothing to rewrite.
    Unchanged,
    /// Rewritten (or would be, in a dry run).
    Rewritten,
    Failed(BatchError),
}

/// Summary counts for a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub unchanged: usize,
    pub rewritten: usize,
    pub failed: usize,
}

impl BatchStats {
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let mut stats = BatchStats::default();
        for outcome in outcomes {
            match outcome.status {
                FileStatus::Unchanged => stats.unchanged += 1,
                FileStatus::Rewritten => stats.rewritten += 1,
                FileStatus::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.unchanged + self.rewritten + self.failed
    }
}

impl std::fmt::Display for BatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rewritten, {} unchanged, {} failed",
            self.rewritten, self.unchanged, self.failed
        )
    }
}

/// Expand `paths` into the HTML files to process, sorted and deduplicated.
///
/// Files named explicitly are taken whatever their extension; directories
/// are walked recursively and filtered by [`HTML_EXTENSIONS`].
pub fn collect_html_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(false) {
                let entry = entry?;
                if entry.file_type().is_file() && is_html(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            return Err(BatchError::NotFound(path.clone()));
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| HTML_EXTENSIONS.iter().any(|h| e.eq_ignore_ascii_case(h)))
}

/// Rewrite every file in `files`, in parallel. With `dry_run` nothing is
/// written; the outcome still says which files would change.
///
/// Outcomes come back in the same order as `files`.
pub fn rewrite_files<S: ContentScanner>(
    files: &[PathBuf],
    redirector: &Redirector<S>,
    dry_run: bool,
) -> Vec<FileOutcome> {
    files
        .par_iter()
        .map(|path| {
            let status = match rewrite_file(path, redirector, dry_run) {
                Ok(true) => {
                    info!(path = %path.display(), dry_run, "rewrote image urls");
                    FileStatus::Rewritten
                }
                Ok(false) => FileStatus::Unchanged,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping file");
                    FileStatus::Failed(e)
                }
            };
            FileOutcome {
                path: path.clone(),
                status,
            }
        })
        .collect()
}

/// Rewrite one file. Returns whether its content changed.
fn rewrite_file<S: ContentScanner>(
    path: &Path,
    redirector: &Redirector<S>,
    dry_run: bool,
) -> Result<bool, BatchError> {
    let io_err = |source| BatchError::Io {
        path: path.to_path_buf(),
        source,
    };
    let original = fs::read_to_string(path).map_err(io_err)?;
    let rewritten = redirector.content(&original);
    if rewritten == original {
        return Ok(false);
    }
    if !dry_run {
        fs::write(path, rewritten).map_err(io_err)?;
    }
    Ok(true)
}
