//! Report delivery
//!
//! One email per vault report, addressed to the vault's whole distribution
//! list in a single `To` header.

pub mod smtp;

pub use smtp::SmtpMailer;

use std::path::Path;

use crate::error::ReportResult;

/// A rendered report ready to be mailed
#[derive(Debug, Clone, Copy)]
pub struct ReportDelivery<'a> {
    /// Path of the written spreadsheet
    pub path: &'a Path,
    /// File name shown to recipients (also the subject)
    pub file_name: &'a str,
    /// Recipient addresses, in configured order
    pub recipients: &'a [String],
}

/// Delivers rendered reports
pub trait ReportMailer {
    /// Send one report; returns the relay's response text
    fn send_report(&self, delivery: &ReportDelivery<'_>) -> ReportResult<String>;
}

/// Plain-text body of a report email
pub fn report_body(file_name: &str) -> String {
    format!(
        "Please review the attached daily CBR report for {}",
        file_name
    )
}
