//! Derived reporting metrics: growth, churn, retention, MRR series and LTV.
//!
//! Every percentage returned from this module is rounded to two decimals.

use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;

/// Monthly price assumed for a subscription with no plan attached.
///
/// MRR is otherwise computed from each subscription's own plan price.
pub const FALLBACK_MONTHLY_PRICE_CENTS: i64 = 2999;

/// Customer lifetime (in months) assumed by the LTV estimate when there was
/// no churn to derive a lifetime from.
pub const LTV_FALLBACK_MONTHS: f64 = 24.0;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert minor currency units (cents) to a display amount.
pub fn cents_to_major(cents: i64) -> f64 {
    round2(cents as f64 / 100.0)
}

/// Percentage change from `previous` to `current`.
///
/// A zero baseline yields `100` when something appeared and `0` otherwise.
pub fn growth_percent(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round2((current - previous) / previous * 100.0)
}

/// `part / whole * 100`, or `0` when `whole` is zero.
pub fn percent_of(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

/// Share of the starting cohort that cancelled during the period.
pub fn churn_rate(churned: i64, starting: i64) -> f64 {
    percent_of(churned, starting)
}

/// Share of the starting cohort that did not cancel. `0` with no cohort.
pub fn retention_rate(churned: i64, starting: i64) -> f64 {
    if starting == 0 {
        return 0.0;
    }
    round2(100.0 - churn_rate(churned, starting))
}

/// Mean of `total` over `count`, `0` when empty.
pub fn average(total: f64, count: i64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round2(total / count as f64)
}

/// Simplified lifetime value: monthly revenue per subscriber over the
/// monthly churn fraction. Falls back to [`LTV_FALLBACK_MONTHS`] of revenue
/// when churn is zero.
pub fn simplified_ltv(monthly_revenue_per_subscriber: f64, monthly_churn_percent: f64) -> f64 {
    if monthly_churn_percent <= 0.0 {
        return round2(monthly_revenue_per_subscriber * LTV_FALLBACK_MONTHS);
    }
    round2(monthly_revenue_per_subscriber / (monthly_churn_percent / 100.0))
}

// ---------------------------------------------------------------------------
// Period comparison
// ---------------------------------------------------------------------------

/// Metrics supported by period comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMetric {
    /// Succeeded payment volume.
    Revenue,
    /// New user signups.
    Users,
    /// New subscriptions started.
    Subscriptions,
}

impl ComparisonMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Users => "users",
            Self::Subscriptions => "subscriptions",
        }
    }
}

impl FromStr for ComparisonMetric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revenue" => Ok(Self::Revenue),
            "users" => Ok(Self::Users),
            "subscriptions" => Ok(Self::Subscriptions),
            other => Err(CoreError::Validation(format!(
                "Unknown metric '{other}': expected one of revenue, users, subscriptions"
            ))),
        }
    }
}

/// Direction of change between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    /// Sign of `value1 - value2`.
    pub fn between(value1: i64, value2: i64) -> Self {
        match value1.cmp(&value2) {
            std::cmp::Ordering::Greater => Self::Up,
            std::cmp::Ordering::Less => Self::Down,
            std::cmp::Ordering::Equal => Self::Flat,
        }
    }
}

// ---------------------------------------------------------------------------
// MRR series
// ---------------------------------------------------------------------------

/// Raw month-end figures, as measured by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRecurring {
    pub month: String,
    pub active_subscriptions: i64,
    /// Monthly-normalized recurring revenue in cents.
    pub recurring_cents: f64,
}

/// One entry of the MRR report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MrrPoint {
    pub month: String,
    pub active_subscriptions: i64,
    pub mrr: f64,
    /// Percent change from the previous entry; `0` for the first.
    pub growth: f64,
}

/// Turn ascending month-end figures into report entries with growth.
pub fn mrr_series(months: Vec<MonthlyRecurring>) -> Vec<MrrPoint> {
    let mut previous: Option<f64> = None;
    months
        .into_iter()
        .map(|m| {
            let mrr = round2(m.recurring_cents / 100.0);
            let growth = previous.map_or(0.0, |prev| growth_percent(mrr, prev));
            previous = Some(mrr);
            MrrPoint {
                month: m.month,
                active_subscriptions: m.active_subscriptions,
                mrr,
                growth,
            }
        })
        .collect()
}
