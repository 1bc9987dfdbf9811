//! Path management for report artifacts
//!
//! Reports are written to a scratch directory, one file per vault:
//! `Backup_Reports-<vault id>-(<YYYY-MM-DD>).xlsx`.
//!
//! ## Path Resolution Order
//!
//! 1. Explicit output directory (`REPORT_OUTPUT_DIR` / `--output-dir`)
//! 2. The system temp directory (`/tmp` on Linux function runtimes)

use std::path::{Path, PathBuf};

use crate::error::{ReportError, ReportResult};

/// File name prefix shared by every report
pub const REPORT_FILE_PREFIX: &str = "Backup_Reports";

/// Report file extension
pub const REPORT_FILE_EXTENSION: &str = "xlsx";

/// Manages the paths report files are written to
#[derive(Debug, Clone)]
pub struct ReportPaths {
    output_dir: PathBuf,
}

impl ReportPaths {
    /// Paths rooted in the system temp directory
    pub fn new() -> Self {
        Self {
            output_dir: std::env::temp_dir(),
        }
    }

    /// Paths rooted in a custom directory (useful for testing)
    pub fn with_output_dir(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Get the output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Display file name for a vault's report
    pub fn report_file_name(&self, vault_id: &str, date_tag: &str) -> String {
        format!(
            "{}-{}-({}).{}",
            REPORT_FILE_PREFIX,
            sanitize_component(vault_id),
            date_tag,
            REPORT_FILE_EXTENSION
        )
    }

    /// Full path of a vault's report
    pub fn report_file(&self, vault_id: &str, date_tag: &str) -> PathBuf {
        self.output_dir
            .join(self.report_file_name(vault_id, date_tag))
    }

    /// Ensure the output directory exists
    ///
    /// Failure is a render error: no report can be written.
    pub fn ensure_output_dir(&self) -> ReportResult<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            ReportError::Render(format!(
                "Failed to create output directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })
    }
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep a vault id from escaping the output directory
fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}
