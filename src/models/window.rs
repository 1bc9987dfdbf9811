//! Report time window
//!
//! The report always covers the previous calendar day as seen from the
//! fixed UTC+3 display offset, ending one minute before midnight.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Offset between UTC and the time zone reports are read in
pub const DISPLAY_UTC_OFFSET_HOURS: i64 = 3;

/// Wire format for `start_time` / `end_time` query parameters
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format of the date tag used in file names and subjects
pub const DATE_TAG_FORMAT: &str = "%Y-%m-%d";

/// Local start of the reported day
const DAY_START: (u32, u32, u32) = (0, 0, 0);

/// Local end of the reported day; 23:59:xx with xx > 0 falls outside
const DAY_END: (u32, u32, u32) = (23, 59, 0);

/// Start/end instants of one reported day plus its date tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    /// First instant of the day (UTC)
    pub start: DateTime<Utc>,
    /// Last instant of the day (UTC, truncated to the minute)
    pub end: DateTime<Utc>,
    /// Calendar date of `end`, used only for naming
    pub date_tag: NaiveDate,
}

impl ReportWindow {
    /// Window for the day before the current system time
    pub fn yesterday() -> Self {
        Self::previous_day(Utc::now())
    }

    /// Window for the day before the UTC calendar date of `now`
    pub fn previous_day(now: DateTime<Utc>) -> Self {
        Self::for_day((now - Duration::days(1)).date_naive())
    }

    /// Window covering `day` in the display offset
    pub fn for_day(day: NaiveDate) -> Self {
        let start = local_to_utc(day, DAY_START);
        let end = local_to_utc(day, DAY_END);

        Self {
            start,
            end,
            date_tag: end.date_naive(),
        }
    }

    /// `start` in wire format
    pub fn start_param(&self) -> String {
        self.start.format(WIRE_TIMESTAMP_FORMAT).to_string()
    }

    /// `end` in wire format
    pub fn end_param(&self) -> String {
        self.end.format(WIRE_TIMESTAMP_FORMAT).to_string()
    }

    /// Date tag as `YYYY-MM-DD`
    pub fn date_tag_string(&self) -> String {
        self.date_tag.format(DATE_TAG_FORMAT).to_string()
    }
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start_param(), self.end_param())
    }
}

fn local_to_utc(day: NaiveDate, (h, m, s): (u32, u32, u32)) -> DateTime<Utc> {
    // Hour/minute/second triples above are compile-time constants in range.
    let time = NaiveTime::from_hms_opt(h, m, s).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&day.and_time(time)) - Duration::hours(DISPLAY_UTC_OFFSET_HOURS)
}
