//! Function entry point
//!
//! The runtime calls [`handler`] with the trigger event, an invocation
//! context exposing encrypted user data, and a completion callback taking
//! `(error, result)`.

use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{ReportError, ReportResult};
use crate::models::credentials::{DOMAIN_NAME_KEY, PASSWORD_KEY, USERNAME_KEY};
use crate::models::{Credentials, ReportWindow};
use crate::services::{ReportPipeline, RunSummary};

/// Result text passed to the callback on success
pub const SUCCESS_MESSAGE: &str = "Reports successfully sent";

/// Invocation context supplied by the function runtime
pub trait FunctionContext {
    /// Look up a user-data value configured on the function
    fn user_data(&self, key: &str) -> Option<String>;
}

/// Context backed by process environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvContext;

impl FunctionContext for EnvContext {
    fn user_data(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

fn required<C: FunctionContext + ?Sized>(context: &C, key: &str) -> ReportResult<String> {
    context
        .user_data(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ReportError::missing_user_data(key))
}

/// Read identity credentials from the invocation context
pub fn credentials_from_context<C: FunctionContext + ?Sized>(
    context: &C,
) -> ReportResult<Credentials> {
    Credentials::new(
        required(context, USERNAME_KEY)?,
        required(context, PASSWORD_KEY)?,
        required(context, DOMAIN_NAME_KEY)?,
    )
}

/// Run one invocation and report its outcome through `callback`
///
/// The summary is also returned on success so a local caller can print it.
pub fn handler<C, F>(
    pipeline: &ReportPipeline,
    event: &Value,
    context: &C,
    window: &ReportWindow,
    callback: F,
) -> Option<RunSummary>
where
    C: FunctionContext + ?Sized,
    F: FnOnce(Option<ReportError>, Option<String>),
{
    debug!(event = %event, "Invocation received");

    let outcome =
        credentials_from_context(context).and_then(|credentials| pipeline.run(&credentials, window));

    match outcome {
        Ok(summary) => {
            info!(reports = summary.reports.len(), "{}", SUCCESS_MESSAGE);
            callback(None, Some(SUCCESS_MESSAGE.to_string()));
            Some(summary)
        }
        Err(e) => {
            error!(stage = e.stage(), error = %e, "Operation failed");
            callback(Some(e), None);
            None
        }
    }
}
