//! Reporting date ranges and calendar month windows.
//!
//! All report queries treat a [`DateRange`] as inclusive on both ends.
//! Month windows are half-open (`start <= t < end`).

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Length of the range used when `dateFrom` is omitted.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// Upper bound for month-based reports (MRR, retention).
pub const MAX_REPORT_MONTHS: u32 = 36;

/// Default number of months for month-based reports.
pub const DEFAULT_REPORT_MONTHS: u32 = 12;

/// Earliest calendar year a report bound may fall in.
pub const MIN_SUPPORTED_YEAR: i32 = 1;

/// Latest calendar year a report bound may fall in.
pub const MAX_SUPPORTED_YEAR: i32 = 9999;

/// Which end of a range a date-only string is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Start,
    End,
}

/// An inclusive `[from, to]` reporting window. Always `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from: Timestamp,
    pub to: Timestamp,
}

impl DateRange {
    /// Build a range, rejecting `from > to`.
    pub fn new(from: Timestamp, to: Timestamp) -> Result<Self, CoreError> {
        if from > to {
            return Err(CoreError::Validation(
                "dateFrom must not be after dateTo".to_string(),
            ));
        }
        Ok(Self { from, to })
    }

    /// Apply the controller defaults: `to` falls back to `now`, `from` to
    /// exactly [`DEFAULT_RANGE_DAYS`] days before `to`.
    pub fn resolve(
        from: Option<Timestamp>,
        to: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<Self, CoreError> {
        let to = to.unwrap_or(now);
        let from = match from {
            Some(from) => from,
            None => shift_back(to, Duration::days(DEFAULT_RANGE_DAYS))?,
        };
        Self::new(from, to)
    }

    /// The `days` days ending at `now`.
    pub fn last_days(days: i64, now: Timestamp) -> Self {
        Self {
            from: now - Duration::days(days),
            to: now,
        }
    }

    /// The equal-length window immediately preceding this one.
    ///
    /// Ends one microsecond before `self.from` so inclusive queries never
    /// count a row in both windows. Fails when that window would start
    /// before [`MIN_SUPPORTED_YEAR`].
    pub fn previous(&self) -> Result<Self, CoreError> {
        let length = self.to - self.from;
        let to = shift_back(self.from, Duration::microseconds(1))?;
        let from = shift_back(to, length)?;
        Ok(Self { from, to })
    }
}

/// Parse a query-string date. Accepts RFC 3339 timestamps or `YYYY-MM-DD`;
/// a bare date is anchored to the start or end of that UTC day.
pub fn parse_range_bound(raw: &str, bound: RangeBound) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return ensure_supported(ts.with_timezone(&Utc)).map_err(|_| out_of_range(raw));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        CoreError::Validation(format!(
            "Invalid date '{raw}': expected YYYY-MM-DD or RFC 3339"
        ))
    })?;
    let ts = match bound {
        RangeBound::Start => start_of_day(date),
        RangeBound::End => date
            .succ_opt()
            .map(|next| start_of_day(next) - Duration::microseconds(1))
            .ok_or_else(|| out_of_range(raw))?,
    };
    ensure_supported(ts).map_err(|_| out_of_range(raw))
}

fn out_of_range(raw: &str) -> CoreError {
    CoreError::Validation(format!(
        "Date '{raw}' is outside the supported years {MIN_SUPPORTED_YEAR}-{MAX_SUPPORTED_YEAR}"
    ))
}

fn ensure_supported(ts: Timestamp) -> Result<Timestamp, CoreError> {
    if (MIN_SUPPORTED_YEAR..=MAX_SUPPORTED_YEAR).contains(&ts.year()) {
        Ok(ts)
    } else {
        Err(CoreError::Validation(format!(
            "{} is outside the supported years {MIN_SUPPORTED_YEAR}-{MAX_SUPPORTED_YEAR}",
            ts.to_rfc3339()
        )))
    }
}

/// `ts - delta`, staying within the supported years.
fn shift_back(ts: Timestamp, delta: Duration) -> Result<Timestamp, CoreError> {
    let shifted = ts.checked_sub_signed(delta).ok_or_else(|| {
        CoreError::Validation("Date range reaches outside the supported years".to_string())
    })?;
    ensure_supported(shifted)
}

fn start_of_day(date: NaiveDate) -> Timestamp {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Midnight UTC on the first day of the month containing `ts`.
pub fn month_start(ts: Timestamp) -> Timestamp {
    start_of_day(first_of_month(ts.date_naive()))
}

/// Midnight UTC at the start of the day containing `ts`.
pub fn day_start(ts: Timestamp) -> Timestamp {
    start_of_day(ts.date_naive())
}

/// One calendar month, `start <= t < end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    /// `YYYY-MM`.
    pub label: String,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl MonthWindow {
    /// Instant at which month-end figures are measured. The current month
    /// has not ended yet, so it is measured at `now`.
    pub fn measured_at(&self, now: Timestamp) -> Timestamp {
        if self.end > now {
            now
        } else {
            self.end
        }
    }
}

/// The `months` calendar months ending with the month containing `now`,
/// in ascending order. `months` is clamped to `1..=MAX_REPORT_MONTHS`.
pub fn trailing_months(now: Timestamp, months: u32) -> Vec<MonthWindow> {
    let months = months.clamp(1, MAX_REPORT_MONTHS);
    let current = first_of_month(now.date_naive());

    (0..months)
        .rev()
        .filter_map(|back| {
            let start = current.checked_sub_months(Months::new(back))?;
            let end = start.checked_add_months(Months::new(1))?;
            Some(MonthWindow {
                label: format!("{:04}-{:02}", start.year(), start.month()),
                start: start_of_day(start),
                end: start_of_day(end),
            })
        })
        .collect()
}
