//! Query-string parameters shared by the analytics and dashboard handlers.
//!
//! Every field arrives as a raw string and is parsed here, so malformed
//! values produce the same JSON error envelope as any other 400.

use serde::Deserialize;
use yogahub_core::date_range::{
    parse_range_bound, DateRange, RangeBound, DEFAULT_REPORT_MONTHS, MAX_REPORT_MONTHS,
};
use yogahub_core::error::CoreError;
use yogahub_core::metrics::ComparisonMetric;
use yogahub_core::roles::is_known_role;
use yogahub_core::types::Timestamp;
use yogahub_db::models::analytics::AnalyticsFilters;

use crate::error::{AppError, AppResult};

/// `?dateFrom=&dateTo=&filters=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// JSON-encoded [`AnalyticsFilters`].
    pub filters: Option<String>,
}

impl RangeParams {
    /// Resolve the reporting window. `dateTo` defaults to `now`, `dateFrom`
    /// to 30 days before `dateTo`.
    pub fn range(&self, now: Timestamp) -> AppResult<DateRange> {
        let from = parse_optional_bound(self.date_from.as_deref(), RangeBound::Start)?;
        let to = parse_optional_bound(self.date_to.as_deref(), RangeBound::End)?;
        Ok(DateRange::resolve(from, to, now)?)
    }

    pub fn filters(&self) -> AppResult<AnalyticsFilters> {
        parse_filters(self.filters.as_deref())
    }
}

/// `?months=`
#[derive(Debug, Default, Deserialize)]
pub struct MonthsParams {
    pub months: Option<String>,
}

impl MonthsParams {
    /// Requested month count, [`DEFAULT_REPORT_MONTHS`] when absent.
    pub fn months(&self) -> AppResult<u32> {
        let Some(raw) = non_blank(self.months.as_deref()) else {
            return Ok(DEFAULT_REPORT_MONTHS);
        };
        match raw.parse::<u32>() {
            Ok(months) if (1..=MAX_REPORT_MONTHS).contains(&months) => Ok(months),
            _ => Err(AppError::BadRequest(format!(
                "months must be an integer between 1 and {MAX_REPORT_MONTHS}"
            ))),
        }
    }
}

/// `?metric=&period1From=&period1To=&period2From=&period2To=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareParams {
    pub metric: Option<String>,
    pub period1_from: Option<String>,
    pub period1_to: Option<String>,
    pub period2_from: Option<String>,
    pub period2_to: Option<String>,
}

/// A fully parsed comparison request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub metric: ComparisonMetric,
    pub period1: DateRange,
    pub period2: DateRange,
}

impl CompareParams {
    /// All five parameters are required.
    pub fn resolve(&self) -> AppResult<Comparison> {
        let (Some(metric), Some(p1_from), Some(p1_to), Some(p2_from), Some(p2_to)) = (
            non_blank(self.metric.as_deref()),
            non_blank(self.period1_from.as_deref()),
            non_blank(self.period1_to.as_deref()),
            non_blank(self.period2_from.as_deref()),
            non_blank(self.period2_to.as_deref()),
        ) else {
            return Err(AppError::BadRequest(
                "metric, period1From, period1To, period2From and period2To are required".into(),
            ));
        };

        Ok(Comparison {
            metric: metric.parse()?,
            period1: parse_period(p1_from, p1_to)?,
            period2: parse_period(p2_from, p2_to)?,
        })
    }
}

fn parse_period(from: &str, to: &str) -> Result<DateRange, CoreError> {
    DateRange::new(
        parse_range_bound(from, RangeBound::Start)?,
        parse_range_bound(to, RangeBound::End)?,
    )
}

fn parse_optional_bound(
    raw: Option<&str>,
    bound: RangeBound,
) -> Result<Option<Timestamp>, CoreError> {
    non_blank(raw)
        .map(|raw| parse_range_bound(raw, bound))
        .transpose()
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Decode the JSON `filters` parameter. Absent or blank means no filters.
pub fn parse_filters(raw: Option<&str>) -> AppResult<AnalyticsFilters> {
    let Some(raw) = non_blank(raw) else {
        return Ok(AnalyticsFilters::default());
    };
    let filters: AnalyticsFilters = serde_json::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("Invalid filters JSON: {e}")))?;
    if let Some(role) = filters.role.as_deref() {
        if !is_known_role(role) {
            return Err(AppError::BadRequest(format!("Unknown role filter '{role}'")));
        }
    }
    Ok(filters)
}
