//! Export module for cbr-report
//!
//! Turns normalized operation logs into per-vault spreadsheet reports:
//! - Partition: split rows by vault, in distribution-list order
//! - Workbook: write one vault's rows to a styled `.xlsx` file

pub mod partition;
pub mod workbook;

pub use partition::{group_by_vault, VaultPartition};
pub use workbook::{ReportRenderer, REPORT_COLUMNS, WORKSHEET_NAME};
