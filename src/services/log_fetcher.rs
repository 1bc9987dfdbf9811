//! Log fetch service
//!
//! Pulls the raw operation logs for a window and turns them into report rows.

use tracing::{error, info, warn};

use crate::cloud::OperationLogSource;
use crate::error::ReportResult;
use crate::models::{LogRecord, ReportWindow, Token};

/// Service for fetching and normalizing operation logs
pub struct LogFetcher<'a> {
    source: &'a dyn OperationLogSource,
}

impl<'a> LogFetcher<'a> {
    /// Create a new log fetcher
    pub fn new(source: &'a dyn OperationLogSource) -> Self {
        Self { source }
    }

    /// Fetch the window's logs, drop deletions, and normalize the rest
    ///
    /// Rows keep the order the service returned them in.
    pub fn fetch(&self, token: &Token, window: &ReportWindow) -> ReportResult<Vec<LogRecord>> {
        let list = self
            .source
            .list_operation_logs(token, window)
            .map_err(|e| {
                error!(error = %e, window = %window, "Failed to fetch operation logs");
                e
            })?;

        let returned = list.operation_logs.len();
        if let Some(count) = list.count {
            if count > returned as u64 {
                warn!(count, returned, "Service reported more logs than it returned");
            }
        }

        let records = LogRecord::from_raw_logs(&list.operation_logs).map_err(|e| {
            error!(error = %e, "Failed to normalize operation logs");
            e
        })?;

        info!(
            fetched = returned,
            kept = records.len(),
            dropped = returned - records.len(),
            "Operation logs fetched"
        );

        Ok(records)
    }
}
