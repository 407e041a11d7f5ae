//! Aggregate rows returned by the analytics queries.
//!
//! Amounts are in cents; conversion to display units happens in the API
//! service layer.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yogahub_core::types::{DbId, Timestamp};

/// Optional narrowing applied to analytics queries, decoded from the JSON
/// `filters` query parameter. Each query honors the fields relevant to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFilters {
    pub plan_id: Option<DbId>,
    pub instructor_id: Option<DbId>,
    pub role: Option<String>,
    pub currency: Option<String>,
}

// ---------------------------------------------------------------------------
// Shared shapes
// ---------------------------------------------------------------------------

/// A per-day count; `day` is `YYYY-MM-DD` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub day: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSignup {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Revenue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct RevenueTotals {
    pub total_cents: i64,
    pub transactions: i64,
    pub refunded_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DailyRevenue {
    pub day: String,
    pub amount_cents: i64,
    pub transactions: i64,
}

/// Revenue grouped by plan; payments without a subscription plan have
/// `plan_id = None`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PlanRevenue {
    pub plan_id: Option<DbId>,
    pub plan_name: Option<String>,
    pub amount_cents: i64,
    pub transactions: i64,
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCount {
    pub plan_id: Option<DbId>,
    pub plan_name: Option<String>,
    pub tier: Option<String>,
    pub count: i64,
}

/// Subscription movement over a range.
///
/// `starting` counts subscriptions active at the start of the range and
/// `churned` those of them cancelled within it.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct ChurnCounts {
    pub starting: i64,
    pub churned: i64,
    pub new_subscriptions: i64,
    pub ending: i64,
}

/// Active subscriptions and their monthly-normalized value at one instant.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RecurringAt {
    pub measured_at: Timestamp,
    pub active_subscriptions: i64,
    pub recurring_cents: f64,
}

/// Users who signed up in one calendar month and how many of them hold an
/// active subscription now.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SignupCohort {
    pub cohort: String,
    pub users: i64,
    pub retained: i64,
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTotals {
    pub programs: i64,
    pub published_programs: i64,
    pub classes: i64,
    pub published_classes: i64,
    pub meditations: i64,
    pub published_meditations: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCreated {
    pub programs: i64,
    pub classes: i64,
    pub meditations: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopClass {
    pub class_id: DbId,
    pub title: String,
    pub instructor_name: String,
    pub views: i64,
    pub completions: i64,
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct EngagementTotals {
    pub active_learners: i64,
    pub watch_seconds: i64,
    pub average_progress: f64,
    pub started_classes: i64,
    pub completed_classes: i64,
}

/// Planner entries or challenge enrollments in a range and how many of
/// them were completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct CompletionCounts {
    pub total: i64,
    pub completed: i64,
}

// ---------------------------------------------------------------------------
// Instructors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct InstructorStats {
    pub instructor_id: DbId,
    pub display_name: String,
    pub programs: i64,
    pub classes: i64,
    pub meditations: i64,
    pub views: i64,
    pub completions: i64,
    pub payouts_cents: i64,
}

// ---------------------------------------------------------------------------
// Realtime
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct RealtimeCounts {
    pub new_users: i64,
    pub active_viewers: i64,
    pub payments: i64,
    pub revenue_cents: i64,
    pub new_subscriptions: i64,
}
