use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate};

/// Half-open calendar range `[start, end)` covered by one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

impl fmt::Display for WeekRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%b %-d"),
            self.end.format("%b %-d, %Y")
        )
    }
}

/// Projects `week_number` onto the calendar.
///
/// Week 1 starts on `semester_start` when one is set, otherwise on January 1
/// of `reference`'s year. Week numbers are not checked against any subject,
/// so out-of-range numbers still get a date. Dates past chrono's range clamp
/// to `NaiveDate::MIN`/`NaiveDate::MAX`.
pub fn week_date_range(
    week_number: i32,
    semester_start: Option<NaiveDate>,
    reference: NaiveDate,
) -> WeekRange {
    let anchor = semester_start.unwrap_or_else(|| year_start(reference));
    let start = saturating_add_weeks(anchor, i64::from(week_number) - 1);
    WeekRange {
        start,
        end: saturating_add_weeks(start, 1),
    }
}

fn saturating_add_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    date.checked_add_signed(Duration::weeks(weeks))
        .unwrap_or(if weeks < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

pub fn week_date_label(
    week_number: i32,
    semester_start: Option<NaiveDate>,
    reference: NaiveDate,
) -> String {
    week_date_range(week_number, semester_start, reference).to_string()
}

fn year_start(reference: NaiveDate) -> NaiveDate {
    reference.with_ordinal(1).unwrap_or(reference)
}

/// Accepts a bare ISO date or a full RFC 3339 timestamp (date part kept).
pub fn parse_semester_start(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|e| format!("invalid semester start date {:?}: {}", raw, e))
}
