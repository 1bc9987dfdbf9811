//! Custom error types for cbr-report
//!
//! One variant per pipeline stage (authentication, log fetch, render,
//! notification) plus the ambient failures around them.

use thiserror::Error;

/// The main error type for report operations
#[derive(Error, Debug)]
pub enum ReportError {
    /// Token could not be obtained from the identity service
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Operation logs could not be fetched or decoded
    #[error("Log fetch error: {0}")]
    LogFetch(String),

    /// Spreadsheet could not be written
    #[error("Render error: {0}")]
    Render(String),

    /// Report email could not be delivered
    #[error("Notification error: {0}")]
    Notification(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// Create a configuration error for a value missing from the invocation context
    pub fn missing_user_data(key: &str) -> Self {
        Self::Config(format!("missing user data '{}'", key))
    }

    /// Name of the pipeline stage this error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "authenticate",
            Self::LogFetch(_) => "fetch",
            Self::Render(_) => "render",
            Self::Notification(_) => "notify",
            Self::Config(_) => "config",
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Render(err.to_string())
    }
}

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;
