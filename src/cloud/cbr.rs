//! Backup service client
//!
//! Lists operation logs for a project within a time window. The listing is
//! read as a single page.

use tracing::{debug, error};

use super::{excerpt, http_client, OperationLogSource};
use crate::error::{ReportError, ReportResult};
use crate::models::{OperationLogList, ReportWindow, Token};

/// Request header carrying the bearer token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Blocking client for the backup service
pub struct CbrClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    project_id: String,
}

impl CbrClient {
    /// Create a client for `endpoint` (base URL without the `/v3` path)
    pub fn new(
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        timeout: std::time::Duration,
    ) -> ReportResult<Self> {
        Ok(Self::with_client(endpoint, project_id, http_client(timeout)?))
    }

    /// Create a client reusing an existing HTTP client
    pub fn with_client(
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        http: reqwest::blocking::Client,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            project_id: project_id.into(),
        }
    }

    fn operation_logs_url(&self) -> String {
        format!("{}/v3/{}/operation-logs", self.endpoint, self.project_id)
    }
}

impl OperationLogSource for CbrClient {
    fn list_operation_logs(
        &self,
        token: &Token,
        window: &ReportWindow,
    ) -> ReportResult<OperationLogList> {
        let url = self.operation_logs_url();
        let start_time = window.start_param();
        let end_time = window.end_param();
        debug!(url = %url, start_time = %start_time, end_time = %end_time, "Listing operation logs");

        let response = self
            .http
            .get(&url)
            .header(AUTH_TOKEN_HEADER, token.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&[("start_time", &start_time), ("end_time", &end_time)])
            .send()
            .map_err(|e| {
                error!(error = %e, url = %url, "Failed to fetch logs");
                ReportError::LogFetch(format!("Operation log request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| {
            error!(error = %e, status = %status, "Failed to read operation log response");
            ReportError::LogFetch(format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, body = %excerpt(&body), "Failed to fetch logs");
            return Err(ReportError::LogFetch(format!(
                "Backup service returned {}: {}",
                status,
                excerpt(&body)
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, body = %excerpt(&body), "Failed to decode operation logs");
            ReportError::LogFetch(format!("Invalid operation log response: {}", e))
        })
    }
}
