//! Spreadsheet rendering
//!
//! Writes one vault's report rows to an `.xlsx` file with a fixed 11-column
//! layout. The header row is bold white on a blue fill; Started/Ended are
//! real date-time cells shown as `yyyy-mm-dd hh:mm:ss`.

use std::path::Path;

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook, Worksheet, XlsxError};
use tracing::{debug, error};

use crate::error::{ReportError, ReportResult};
use crate::models::LogRecord;

/// Name of the single worksheet in every report
pub const WORKSHEET_NAME: &str = "CBR Logs";

/// Header fill color (RGB)
pub const HEADER_FILL_COLOR: u32 = 0x4F81BD;

/// Display pattern for date-time columns
pub const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// How a column's values are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    DateTime,
}

/// One report column
#[derive(Debug, Clone, Copy)]
pub struct ReportColumn {
    pub header: &'static str,
    pub width: f64,
    pub kind: ColumnKind,
}

const fn text(header: &'static str, width: f64) -> ReportColumn {
    ReportColumn {
        header,
        width,
        kind: ColumnKind::Text,
    }
}

const fn datetime(header: &'static str, width: f64) -> ReportColumn {
    ReportColumn {
        header,
        width,
        kind: ColumnKind::DateTime,
    }
}

/// Report layout, in `LogRecord` field order
pub const REPORT_COLUMNS: [ReportColumn; 11] = [
    text("TaskID", 20.0),
    text("BackupID", 20.0),
    text("TaskType", 15.0),
    text("Status", 15.0),
    text("ResourceID", 20.0),
    text("ResourceName", 20.0),
    text("ResourceType", 20.0),
    text("VaultID", 20.0),
    text("VaultName", 20.0),
    datetime("Started", 20.0),
    datetime("Ended", 20.0),
];

/// A single cell value taken from a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellValue<'a> {
    Text(Option<&'a str>),
    DateTime(Option<&'a NaiveDateTime>),
}

/// Cell values of a record, in `REPORT_COLUMNS` order
fn record_cells(record: &LogRecord) -> [CellValue<'_>; 11] {
    [
        CellValue::Text(Some(&record.task_id)),
        CellValue::Text(record.backup_id.as_deref()),
        CellValue::Text(Some(&record.task_type)),
        CellValue::Text(Some(&record.status)),
        CellValue::Text(record.resource_id.as_deref()),
        CellValue::Text(record.resource_name.as_deref()),
        CellValue::Text(record.resource_type.as_deref()),
        CellValue::Text(Some(&record.vault_id)),
        CellValue::Text(record.vault_name.as_deref()),
        CellValue::DateTime(Some(&record.started)),
        CellValue::DateTime(record.ended.as_ref()),
    ]
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL_COLOR))
        .set_pattern(FormatPattern::Solid)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

fn datetime_format() -> Format {
    Format::new().set_num_format(DATETIME_NUM_FORMAT)
}

/// Renders report rows into spreadsheet files
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Write `records` to `path`, one row per record in iteration order
    ///
    /// Returns the number of data rows written.
    pub fn render<'a, I>(&self, records: I, path: &Path) -> ReportResult<usize>
    where
        I: IntoIterator<Item = &'a LogRecord>,
    {
        let mut workbook = Workbook::new();
        let rows = fill_worksheet(workbook.add_worksheet(), records).map_err(|e| {
            error!(error = %e, path = %path.display(), "Failed to build worksheet");
            ReportError::from(e)
        })?;

        workbook.save(path).map_err(|e| {
            error!(error = %e, path = %path.display(), "Failed to write report");
            ReportError::Render(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), rows, "Report written");
        Ok(rows)
    }
}

fn fill_worksheet<'a, I>(worksheet: &mut Worksheet, records: I) -> Result<usize, XlsxError>
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    worksheet.set_name(WORKSHEET_NAME)?;

    let header_format = header_format();
    let datetime_format = datetime_format();

    for (col, column) in REPORT_COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, column.width)?;
        if column.kind == ColumnKind::DateTime {
            worksheet.set_column_format(col, &datetime_format)?;
        }
        worksheet.write_string_with_format(0, col, column.header, &header_format)?;
    }

    let mut rows = 0usize;
    for (index, record) in records.into_iter().enumerate() {
        let row = index as u32 + 1;
        for (col, cell) in record_cells(record).into_iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Text(Some(value)) => {
                    worksheet.write_string(row, col, value)?;
                }
                CellValue::DateTime(Some(value)) => {
                    worksheet.write_datetime_with_format(row, col, value, &datetime_format)?;
                }
                CellValue::Text(None) | CellValue::DateTime(None) => {}
            }
        }
        rows += 1;
    }

    Ok(rows)
}
