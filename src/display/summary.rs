//! Run summary formatting
//!
//! Formats the outcome of a report run as a table for the CLI.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::ReportWindow;
use crate::services::{RunSummary, VaultReport};

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Vault")]
    vault: String,
    #[tabled(rename = "Rows")]
    rows: usize,
    #[tabled(rename = "Recipients")]
    recipients: String,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Delivery")]
    delivery: String,
}

impl From<&VaultReport> for SummaryRow {
    fn from(report: &VaultReport) -> Self {
        Self {
            vault: report.vault_id.clone(),
            rows: report.rows,
            recipients: report.recipients.join(", "),
            file: report.path.display().to_string(),
            delivery: report
                .response
                .clone()
                .unwrap_or_else(|| "not sent".to_string()),
        }
    }
}

/// Format a run summary as a table
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut output = format!(
        "Window {} ({}): {} record(s)\n",
        summary.window,
        summary.window.date_tag_string(),
        summary.records
    );

    if summary.reports.is_empty() {
        output.push_str("No reports generated.");
        return output;
    }

    let rows: Vec<SummaryRow> = summary.reports.iter().map(SummaryRow::from).collect();
    output.push_str(&Table::new(rows).with(Style::modern()).to_string());
    output
}

/// Format a report window, one field per line
pub fn format_window(window: &ReportWindow) -> String {
    format!(
        "start:    {}\nend:      {}\ndate tag: {}",
        window.start_param(),
        window.end_param(),
        window.date_tag_string()
    )
}
