//! Analytics reports.
//!
//! Each report runs its independent aggregates concurrently on the shared
//! pool and derives the ratios in `yogahub_core::metrics`. Money is
//! reported in major currency units.

use chrono::Duration;
use serde::Serialize;
use sqlx::PgPool;
use yogahub_core::date_range::{day_start, month_start, trailing_months, DateRange};
use yogahub_core::error::CoreError;
use yogahub_core::metrics::{
    average, cents_to_major, churn_rate, growth_percent, mrr_series, percent_of, retention_rate,
    round2, simplified_ltv, ComparisonMetric, Direction, MonthlyRecurring, MrrPoint,
    LTV_FALLBACK_MONTHS,
};
use yogahub_core::types::{DbId, Timestamp};
use yogahub_db::models::analytics::{
    AnalyticsFilters, ContentCreated, ContentTotals, DailyCount, DailyRevenue, InstructorStats,
    PlanCount, PlanRevenue, RecentSignup, RecurringAt, RoleCount, StatusCount, TopClass,
};
use yogahub_db::repositories::AnalyticsRepo;

use crate::error::AppResult;

/// Window covered by the realtime snapshot.
pub const REALTIME_WINDOW_MINUTES: i64 = 60;

/// Window used for the churn figure in the overview and LTV.
pub const CHURN_WINDOW_DAYS: i64 = 30;

/// Rows returned by "top N" lists.
pub const TOP_LIST_LIMIT: i64 = 10;

/// Recent signups shown on the overview.
pub const OVERVIEW_RECENT_SIGNUPS: i64 = 5;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub range: DateRange,
    pub total_users: i64,
    pub new_users: i64,
    pub active_users: i64,
    pub previous_new_users: i64,
    pub growth: f64,
    pub users_by_role: Vec<RoleCount>,
    pub daily_signups: Vec<DailyCount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    pub day: String,
    pub amount: f64,
    pub transactions: i64,
}

impl From<DailyRevenue> for RevenuePoint {
    fn from(row: DailyRevenue) -> Self {
        Self {
            day: row.day,
            amount: cents_to_major(row.amount_cents),
            transactions: row.transactions,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRevenueEntry {
    pub plan_id: Option<DbId>,
    pub plan_name: Option<String>,
    pub amount: f64,
    pub transactions: i64,
}

impl From<PlanRevenue> for PlanRevenueEntry {
    fn from(row: PlanRevenue) -> Self {
        Self {
            plan_id: row.plan_id,
            plan_name: row.plan_name,
            amount: cents_to_major(row.amount_cents),
            transactions: row.transactions,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueAnalytics {
    pub range: DateRange,
    pub total_revenue: f64,
    pub transactions: i64,
    pub average_transaction: f64,
    pub refunded: f64,
    pub previous_revenue: f64,
    pub growth: f64,
    pub daily_revenue: Vec<RevenuePoint>,
    pub revenue_by_plan: Vec<PlanRevenueEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionAnalytics {
    pub range: DateRange,
    /// Active at the end of the range.
    pub active: i64,
    pub new_subscriptions: i64,
    pub cancelled: i64,
    pub churn_rate: f64,
    pub by_plan: Vec<PlanCount>,
    pub by_status: Vec<StatusCount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopClassEntry {
    pub class_id: DbId,
    pub title: String,
    pub instructor_name: String,
    pub views: i64,
    pub completions: i64,
    pub completion_rate: f64,
}

impl From<TopClass> for TopClassEntry {
    fn from(row: TopClass) -> Self {
        Self {
            completion_rate: percent_of(row.completions, row.views),
            class_id: row.class_id,
            title: row.title,
            instructor_name: row.instructor_name,
            views: row.views,
            completions: row.completions,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalytics {
    pub range: DateRange,
    pub totals: ContentTotals,
    pub created_in_range: ContentCreated,
    pub top_classes: Vec<TopClassEntry>,
    /// Completed share of class views in the range.
    pub completion_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementAnalytics {
    pub range: DateRange,
    pub active_learners: i64,
    pub total_watch_minutes: f64,
    pub average_progress: f64,
    pub completed_classes: i64,
    pub planner_entries: i64,
    pub planner_completion_rate: f64,
    pub challenge_enrollments: i64,
    pub challenge_completion_rate: f64,
    pub daily_active_learners: Vec<DailyCount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorReport {
    pub instructor_id: DbId,
    pub display_name: String,
    pub programs: i64,
    pub classes: i64,
    pub meditations: i64,
    pub views: i64,
    pub completions: i64,
    pub completion_rate: f64,
    pub payouts: f64,
}

impl From<InstructorStats> for InstructorReport {
    fn from(row: InstructorStats) -> Self {
        Self {
            completion_rate: percent_of(row.completions, row.views),
            payouts: cents_to_major(row.payouts_cents),
            instructor_id: row.instructor_id,
            display_name: row.display_name,
            programs: row.programs,
            classes: row.classes,
            meditations: row.meditations,
            views: row.views,
            completions: row.completions,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorAnalytics {
    pub range: DateRange,
    pub instructors: Vec<InstructorReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorDetail {
    pub range: DateRange,
    #[serde(flatten)]
    pub instructor: InstructorReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeSnapshot {
    pub since: Timestamp,
    pub as_of: Timestamp,
    pub new_users: i64,
    pub active_viewers: i64,
    pub payments: i64,
    pub revenue: f64,
    pub new_subscriptions: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrReport {
    pub as_of: Timestamp,
    pub active_subscriptions: i64,
    pub mrr: f64,
    pub arr: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnReport {
    pub range: DateRange,
    pub starting_subscriptions: i64,
    pub churned_subscriptions: i64,
    pub new_subscriptions: i64,
    pub ending_subscriptions: i64,
    pub churn_rate: f64,
    pub retention_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LtvReport {
    pub active_subscriptions: i64,
    pub average_revenue_per_subscriber: f64,
    pub monthly_churn_rate: f64,
    pub estimated_lifetime_months: f64,
    pub ltv: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortRetention {
    pub cohort: String,
    pub users: i64,
    pub retained: i64,
    pub retention_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodValue {
    pub from: Timestamp,
    pub to: Timestamp,
    pub value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub metric: ComparisonMetric,
    pub period1: PeriodValue,
    pub period2: PeriodValue,
    pub change: f64,
    pub change_percent: f64,
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewDashboard {
    pub total_users: i64,
    pub new_users_today: i64,
    pub revenue_this_month: f64,
    pub active_subscriptions: i64,
    pub mrr: f64,
    pub churn_rate: f64,
    pub content: ContentTotals,
    pub recent_signups: Vec<RecentSignup>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// User counts for the range, with new-user growth against the preceding
/// equal-length window. Honors the `role` filter.
pub async fn user_analytics(
    pool: &PgPool,
    range: &DateRange,
    filters: &AnalyticsFilters,
) -> AppResult<UserAnalytics> {
    let role = filters.role.as_deref();
    let previous = range.previous()?;

    let (total_users, new_users, active_users, previous_new_users, users_by_role, daily_signups) =
        tokio::try_join!(
            AnalyticsRepo::count_users(pool, role),
            AnalyticsRepo::count_new_users(pool, range, role),
            AnalyticsRepo::count_active_users(pool, range, role),
            AnalyticsRepo::count_new_users(pool, &previous, role),
            AnalyticsRepo::users_by_role(pool),
            AnalyticsRepo::daily_signups(pool, range, role),
        )?;

    Ok(UserAnalytics {
        range: *range,
        total_users,
        new_users,
        active_users,
        previous_new_users,
        growth: growth_percent(new_users as f64, previous_new_users as f64),
        users_by_role,
        daily_signups,
    })
}

/// Payment volume for the range. Honors `planId` and `currency`.
pub async fn revenue_analytics(
    pool: &PgPool,
    range: &DateRange,
    filters: &AnalyticsFilters,
) -> AppResult<RevenueAnalytics> {
    let previous = range.previous()?;

    let (totals, previous_totals, daily, by_plan) = tokio::try_join!(
        AnalyticsRepo::revenue_totals(pool, range, filters),
        AnalyticsRepo::revenue_totals(pool, &previous, filters),
        AnalyticsRepo::daily_revenue(pool, range, filters),
        AnalyticsRepo::revenue_by_plan(pool, range, filters),
    )?;

    let total_revenue = cents_to_major(totals.total_cents);
    let previous_revenue = cents_to_major(previous_totals.total_cents);

    Ok(RevenueAnalytics {
        range: *range,
        total_revenue,
        transactions: totals.transactions,
        average_transaction: average(total_revenue, totals.transactions),
        refunded: cents_to_major(totals.refunded_cents),
        previous_revenue,
        growth: growth_percent(total_revenue, previous_revenue),
        daily_revenue: daily.into_iter().map(RevenuePoint::from).collect(),
        revenue_by_plan: by_plan.into_iter().map(PlanRevenueEntry::from).collect(),
    })
}

/// Subscription movement for the range. Honors `planId`.
pub async fn subscription_analytics(
    pool: &PgPool,
    range: &DateRange,
    filters: &AnalyticsFilters,
) -> AppResult<SubscriptionAnalytics> {
    let plan_id = filters.plan_id;

    let (active, churn, cancelled, by_plan, by_status) = tokio::try_join!(
        AnalyticsRepo::count_active_subscriptions(pool, range.to, plan_id),
        AnalyticsRepo::churn_counts(pool, range, plan_id),
        AnalyticsRepo::count_cancelled_subscriptions(pool, range, plan_id),
        AnalyticsRepo::subscriptions_by_plan(pool, range.to, plan_id),
        AnalyticsRepo::subscriptions_by_status(pool, plan_id),
    )?;

    Ok(SubscriptionAnalytics {
        range: *range,
        active,
        new_subscriptions: churn.new_subscriptions,
        cancelled,
        churn_rate: churn_rate(churn.churned, churn.starting),
        by_plan,
        by_status,
    })
}

/// Catalog size and class popularity. Honors `instructorId`.
pub async fn content_analytics(
    pool: &PgPool,
    range: &DateRange,
    filters: &AnalyticsFilters,
) -> AppResult<ContentAnalytics> {
    let instructor_id = filters.instructor_id;

    let (totals, created_in_range, top_classes, engagement) = tokio::try_join!(
        AnalyticsRepo::content_totals(pool, instructor_id),
        AnalyticsRepo::content_created(pool, range, instructor_id),
        AnalyticsRepo::top_classes(pool, range, instructor_id, TOP_LIST_LIMIT),
        AnalyticsRepo::engagement_totals(pool, range, instructor_id),
    )?;

    Ok(ContentAnalytics {
        range: *range,
        totals,
        created_in_range,
        top_classes: top_classes.into_iter().map(TopClassEntry::from).collect(),
        completion_rate: percent_of(engagement.completed_classes, engagement.started_classes),
    })
}

/// Learner activity. Video figures honor `instructorId`; planner and
/// challenge figures are platform-wide.
pub async fn engagement_analytics(
    pool: &PgPool,
    range: &DateRange,
    filters: &AnalyticsFilters,
) -> AppResult<EngagementAnalytics> {
    let instructor_id = filters.instructor_id;

    let (totals, planner, challenges, daily_active_learners) = tokio::try_join!(
        AnalyticsRepo::engagement_totals(pool, range, instructor_id),
        AnalyticsRepo::planner_counts(pool, range),
        AnalyticsRepo::challenge_counts(pool, range),
        AnalyticsRepo::daily_active_learners(pool, range, instructor_id),
    )?;

    Ok(EngagementAnalytics {
        range: *range,
        active_learners: totals.active_learners,
        total_watch_minutes: round2(totals.watch_seconds as f64 / 60.0),
        average_progress: round2(totals.average_progress),
        completed_classes: totals.completed_classes,
        planner_entries: planner.total,
        planner_completion_rate: percent_of(planner.completed, planner.total),
        challenge_enrollments: challenges.total,
        challenge_completion_rate: percent_of(challenges.completed, challenges.total),
        daily_active_learners,
    })
}

/// Every instructor, ranked by class views in the range. `limit` caps the
/// list.
pub async fn instructor_analytics(
    pool: &PgPool,
    range: &DateRange,
    limit: Option<i64>,
) -> AppResult<InstructorAnalytics> {
    let rows = AnalyticsRepo::instructor_stats(pool, range, None, limit).await?;
    Ok(InstructorAnalytics {
        range: *range,
        instructors: rows.into_iter().map(InstructorReport::from).collect(),
    })
}

/// One instructor's figures. Unknown ids are a not-found error.
pub async fn instructor_detail(
    pool: &PgPool,
    range: &DateRange,
    instructor_id: DbId,
) -> AppResult<InstructorDetail> {
    let row = AnalyticsRepo::instructor_stats(pool, range, Some(instructor_id), Some(1))
        .await?
        .into_iter()
        .next()
        .ok_or(CoreError::NotFound {
            entity: "Instructor",
            id: instructor_id,
        })?;
    Ok(InstructorDetail {
        range: *range,
        instructor: row.into(),
    })
}

/// Activity in the last [`REALTIME_WINDOW_MINUTES`] minutes.
pub async fn realtime_snapshot(pool: &PgPool, now: Timestamp) -> AppResult<RealtimeSnapshot> {
    let since = now - Duration::minutes(REALTIME_WINDOW_MINUTES);
    let counts = AnalyticsRepo::realtime_counts(pool, since).await?;
    Ok(RealtimeSnapshot {
        since,
        as_of: now,
        new_users: counts.new_users,
        active_viewers: counts.active_viewers,
        payments: counts.payments,
        revenue: cents_to_major(counts.revenue_cents),
        new_subscriptions: counts.new_subscriptions,
    })
}

/// MRR for the `months` calendar months ending with the current one, oldest
/// first. Completed months are measured at their end; the current month at
/// `now`.
pub async fn mrr_report(pool: &PgPool, months: u32, now: Timestamp) -> AppResult<Vec<MrrPoint>> {
    let windows = trailing_months(now, months);
    let instants: Vec<Timestamp> = windows.iter().map(|w| w.measured_at(now)).collect();
    let measured = AnalyticsRepo::recurring_at(pool, &instants).await?;

    let monthly = windows
        .into_iter()
        .zip(measured)
        .map(|(window, row)| MonthlyRecurring {
            month: window.label,
            active_subscriptions: row.active_subscriptions,
            recurring_cents: row.recurring_cents,
        })
        .collect();

    Ok(mrr_series(monthly))
}

async fn recurring_now(pool: &PgPool, now: Timestamp) -> Result<RecurringAt, sqlx::Error> {
    let row = AnalyticsRepo::recurring_at(pool, &[now]).await?.into_iter().next();
    Ok(row.unwrap_or(RecurringAt {
        measured_at: now,
        active_subscriptions: 0,
        recurring_cents: 0.0,
    }))
}

/// Current MRR annualized.
pub async fn arr_report(pool: &PgPool, now: Timestamp) -> AppResult<ArrReport> {
    let current = recurring_now(pool, now).await?;
    let mrr = round2(current.recurring_cents / 100.0);
    Ok(ArrReport {
        as_of: now,
        active_subscriptions: current.active_subscriptions,
        mrr,
        arr: round2(mrr * 12.0),
    })
}

/// Churn of the subscriptions active at the start of the range.
pub async fn churn_report(
    pool: &PgPool,
    range: &DateRange,
    plan_id: Option<DbId>,
) -> AppResult<ChurnReport> {
    let counts = AnalyticsRepo::churn_counts(pool, range, plan_id).await?;
    Ok(ChurnReport {
        range: *range,
        starting_subscriptions: counts.starting,
        churned_subscriptions: counts.churned,
        new_subscriptions: counts.new_subscriptions,
        ending_subscriptions: counts.ending,
        churn_rate: churn_rate(counts.churned, counts.starting),
        retention_rate: retention_rate(counts.churned, counts.starting),
    })
}

/// Simplified lifetime value from current MRR and 30-day churn.
pub async fn ltv_report(pool: &PgPool, now: Timestamp) -> AppResult<LtvReport> {
    let window = DateRange::last_days(CHURN_WINDOW_DAYS, now);
    let (current, churn) = tokio::try_join!(
        recurring_now(pool, now),
        AnalyticsRepo::churn_counts(pool, &window, None),
    )?;

    let arps = average(current.recurring_cents / 100.0, current.active_subscriptions);
    let monthly_churn_rate = churn_rate(churn.churned, churn.starting);
    let estimated_lifetime_months = if monthly_churn_rate > 0.0 {
        round2(100.0 / monthly_churn_rate)
    } else {
        LTV_FALLBACK_MONTHS
    };

    Ok(LtvReport {
        active_subscriptions: current.active_subscriptions,
        average_revenue_per_subscriber: arps,
        monthly_churn_rate,
        estimated_lifetime_months,
        ltv: simplified_ltv(arps, monthly_churn_rate),
    })
}

/// Signup cohorts for the trailing `months` months, one entry per month
/// (empty months included), with the share still subscribed now.
pub async fn retention_report(
    pool: &PgPool,
    months: u32,
    now: Timestamp,
) -> AppResult<Vec<CohortRetention>> {
    let windows = trailing_months(now, months);
    let Some(since) = windows.first().map(|w| w.start) else {
        return Ok(Vec::new());
    };
    let cohorts = AnalyticsRepo::signup_cohorts(pool, since, now).await?;

    Ok(windows
        .into_iter()
        .map(|window| {
            let (users, retained) = cohorts
                .iter()
                .find(|c| c.cohort == window.label)
                .map_or((0, 0), |c| (c.users, c.retained));
            CohortRetention {
                cohort: window.label,
                users,
                retained,
                retention_rate: percent_of(retained, users),
            }
        })
        .collect())
}

/// Compare one metric across two periods. `direction` follows the sign of
/// `value1 - value2`.
pub async fn compare_periods(
    pool: &PgPool,
    metric: ComparisonMetric,
    period1: &DateRange,
    period2: &DateRange,
) -> AppResult<ComparisonReport> {
    let (raw1, raw2) = tokio::try_join!(
        AnalyticsRepo::metric_value(pool, metric, period1),
        AnalyticsRepo::metric_value(pool, metric, period2),
    )?;

    let display = |raw: i64| match metric {
        ComparisonMetric::Revenue => cents_to_major(raw),
        ComparisonMetric::Users | ComparisonMetric::Subscriptions => raw as f64,
    };
    let (value1, value2) = (display(raw1), display(raw2));

    Ok(ComparisonReport {
        metric,
        period1: PeriodValue {
            from: period1.from,
            to: period1.to,
            value: value1,
        },
        period2: PeriodValue {
            from: period2.from,
            to: period2.to,
            value: value2,
        },
        change: round2(value1 - value2),
        change_percent: growth_percent(value1, value2),
        direction: Direction::between(raw1, raw2),
    })
}

/// Headline figures for the analytics landing page.
pub async fn overview(pool: &PgPool, now: Timestamp) -> AppResult<OverviewDashboard> {
    let today = DateRange {
        from: day_start(now),
        to: now,
    };
    let this_month = DateRange {
        from: month_start(now),
        to: now,
    };
    let churn_window = DateRange::last_days(CHURN_WINDOW_DAYS, now);
    let no_filters = AnalyticsFilters::default();

    let (total_users, new_users_today, revenue, current, churn, content, recent_signups) =
        tokio::try_join!(
            AnalyticsRepo::count_users(pool, None),
            AnalyticsRepo::count_new_users(pool, &today, None),
            AnalyticsRepo::revenue_totals(pool, &this_month, &no_filters),
            recurring_now(pool, now),
            AnalyticsRepo::churn_counts(pool, &churn_window, None),
            AnalyticsRepo::content_totals(pool, None),
            AnalyticsRepo::recent_signups(pool, OVERVIEW_RECENT_SIGNUPS),
        )?;

    Ok(OverviewDashboard {
        total_users,
        new_users_today,
        revenue_this_month: cents_to_major(revenue.total_cents),
        active_subscriptions: current.active_subscriptions,
        mrr: round2(current.recurring_cents / 100.0),
        churn_rate: churn_rate(churn.churned, churn.starting),
        content,
        recent_signups,
    })
}
