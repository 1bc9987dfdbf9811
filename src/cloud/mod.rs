//! Clients for the remote cloud services
//!
//! The identity service issues the bearer token; the backup service lists
//! operation logs. Both sit behind traits so the pipeline can be driven by
//! test doubles.

pub mod cbr;
pub mod iam;

pub use cbr::CbrClient;
pub use iam::IamClient;

use std::time::Duration;

use crate::error::{ReportError, ReportResult};
use crate::models::{Credentials, OperationLogList, ReportWindow, Token};

/// Issues project-scoped bearer tokens
pub trait IdentityService {
    /// Exchange password credentials for a token scoped to `scope` (a project name)
    fn issue_token(&self, credentials: &Credentials, scope: &str) -> ReportResult<Token>;
}

/// Lists backup operation logs
pub trait OperationLogSource {
    /// All operation logs between `window.start` and `window.end`
    fn list_operation_logs(
        &self,
        token: &Token,
        window: &ReportWindow,
    ) -> ReportResult<OperationLogList>;
}

/// Build a blocking HTTP client with the given timeout
pub fn http_client(timeout: Duration) -> ReportResult<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ReportError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Shorten a response body for error messages
pub(crate) fn excerpt(body: &str) -> String {
    const MAX: usize = 200;
    let body = body.trim();
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
