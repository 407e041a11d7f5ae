//! Aggregation queries backing the analytics reports and dashboard widgets.
//!
//! Every range predicate is inclusive (`>= from AND <= to`). Optional
//! filters are bound as nullable parameters (`$n IS NULL OR col = $n`), so
//! each query has a single fixed text. Aggregates are cast to `BIGINT` or
//! `FLOAT8` to decode into plain integers and floats.

use sqlx::PgPool;
use yogahub_core::date_range::DateRange;
use yogahub_core::metrics::{ComparisonMetric, FALLBACK_MONTHLY_PRICE_CENTS};
use yogahub_core::types::{DbId, Timestamp};

use crate::models::analytics::{
    AnalyticsFilters, ChurnCounts, CompletionCounts, ContentCreated, ContentTotals, DailyCount,
    DailyRevenue, EngagementTotals, InstructorStats, PlanCount, PlanRevenue, RealtimeCounts,
    RecentSignup, RecurringAt, RevenueTotals, RoleCount, SignupCohort, StatusCount, TopClass,
};

/// Predicate for a subscription aliased `s` being active at the instant
/// expressed by `at` (a bind parameter or column).
///
/// Trials are not counted. A subscription stops being active at its
/// cancellation or end time, whichever is set.
fn active_at(at: &str) -> String {
    format!(
        "s.status <> 'trialing' \
         AND s.started_at <= {at} \
         AND (s.cancelled_at IS NULL OR s.cancelled_at > {at}) \
         AND (s.ends_at IS NULL OR s.ends_at > {at})"
    )
}

/// Provides read-only aggregate queries over the platform tables.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub async fn count_users(pool: &PgPool, role: Option<&str>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE ($1::TEXT IS NULL OR role = $1)")
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Users created within the range.
    pub async fn count_new_users(
        pool: &PgPool,
        range: &DateRange,
        role: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM users \
             WHERE created_at >= $1 AND created_at <= $2 \
               AND ($3::TEXT IS NULL OR role = $3)",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(role)
        .fetch_one(pool)
        .await
    }

    /// Users whose last login falls within the range.
    pub async fn count_active_users(
        pool: &PgPool,
        range: &DateRange,
        role: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM users \
             WHERE last_login_at >= $1 AND last_login_at <= $2 \
               AND ($3::TEXT IS NULL OR role = $3)",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(role)
        .fetch_one(pool)
        .await
    }

    pub async fn users_by_role(pool: &PgPool) -> Result<Vec<RoleCount>, sqlx::Error> {
        sqlx::query_as::<_, RoleCount>(
            "SELECT role, COUNT(*) AS count FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(pool)
        .await
    }

    /// Signups per UTC day; days without signups are omitted.
    pub async fn daily_signups(
        pool: &PgPool,
        range: &DateRange,
        role: Option<&str>,
    ) -> Result<Vec<DailyCount>, sqlx::Error> {
        sqlx::query_as::<_, DailyCount>(
            "SELECT to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day, \
                    COUNT(*) AS count \
             FROM users \
             WHERE created_at >= $1 AND created_at <= $2 \
               AND ($3::TEXT IS NULL OR role = $3) \
             GROUP BY 1 ORDER BY 1",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(role)
        .fetch_all(pool)
        .await
    }

    /// Newest users first.
    pub async fn recent_signups(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<RecentSignup>, sqlx::Error> {
        sqlx::query_as::<_, RecentSignup>(
            "SELECT id, email, display_name, role, created_at FROM users \
             ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Revenue
    // -----------------------------------------------------------------------

    /// Succeeded payment volume and count, plus refunded volume.
    ///
    /// Honors `plan_id` (through the payment's subscription) and `currency`.
    pub async fn revenue_totals(
        pool: &PgPool,
        range: &DateRange,
        filters: &AnalyticsFilters,
    ) -> Result<RevenueTotals, sqlx::Error> {
        sqlx::query_as::<_, RevenueTotals>(
            "SELECT \
                COALESCE(SUM(p.amount_cents) FILTER (WHERE p.status = 'succeeded'), 0)::BIGINT \
                    AS total_cents, \
                COUNT(*) FILTER (WHERE p.status = 'succeeded') AS transactions, \
                COALESCE(SUM(p.amount_cents) FILTER (WHERE p.status = 'refunded'), 0)::BIGINT \
                    AS refunded_cents \
             FROM payments p \
             LEFT JOIN subscriptions s ON s.id = p.subscription_id \
             WHERE p.paid_at >= $1 AND p.paid_at <= $2 \
               AND ($3::BIGINT IS NULL OR s.plan_id = $3) \
               AND ($4::TEXT IS NULL OR p.currency = $4)",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(filters.plan_id)
        .bind(filters.currency.as_deref())
        .fetch_one(pool)
        .await
    }

    /// Succeeded payments per UTC day.
    pub async fn daily_revenue(
        pool: &PgPool,
        range: &DateRange,
        filters: &AnalyticsFilters,
    ) -> Result<Vec<DailyRevenue>, sqlx::Error> {
        sqlx::query_as::<_, DailyRevenue>(
            "SELECT to_char(p.paid_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day, \
                    COALESCE(SUM(p.amount_cents), 0)::BIGINT AS amount_cents, \
                    COUNT(*) AS transactions \
             FROM payments p \
             LEFT JOIN subscriptions s ON s.id = p.subscription_id \
             WHERE p.status = 'succeeded' \
               AND p.paid_at >= $1 AND p.paid_at <= $2 \
               AND ($3::BIGINT IS NULL OR s.plan_id = $3) \
               AND ($4::TEXT IS NULL OR p.currency = $4) \
             GROUP BY 1 ORDER BY 1",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(filters.plan_id)
        .bind(filters.currency.as_deref())
        .fetch_all(pool)
        .await
    }

    /// Succeeded payments grouped by the plan of their subscription.
    pub async fn revenue_by_plan(
        pool: &PgPool,
        range: &DateRange,
        filters: &AnalyticsFilters,
    ) -> Result<Vec<PlanRevenue>, sqlx::Error> {
        sqlx::query_as::<_, PlanRevenue>(
            "SELECT sp.id AS plan_id, sp.name AS plan_name, \
                    COALESCE(SUM(p.amount_cents), 0)::BIGINT AS amount_cents, \
                    COUNT(*) AS transactions \
             FROM payments p \
             LEFT JOIN subscriptions s ON s.id = p.subscription_id \
             LEFT JOIN subscription_plans sp ON sp.id = s.plan_id \
             WHERE p.status = 'succeeded' \
               AND p.paid_at >= $1 AND p.paid_at <= $2 \
               AND ($3::BIGINT IS NULL OR s.plan_id = $3) \
               AND ($4::TEXT IS NULL OR p.currency = $4) \
             GROUP BY sp.id, sp.name \
             ORDER BY amount_cents DESC, sp.id",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(filters.plan_id)
        .bind(filters.currency.as_deref())
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Subscriptions active at `at`.
    pub async fn count_active_subscriptions(
        pool: &PgPool,
        at: Timestamp,
        plan_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM subscriptions s \
             WHERE {} AND ($2::BIGINT IS NULL OR s.plan_id = $2)",
            active_at("$1")
        );
        sqlx::query_scalar(&query)
            .bind(at)
            .bind(plan_id)
            .fetch_one(pool)
            .await
    }

    /// Paid subscriptions started within the range.
    pub async fn count_new_subscriptions(
        pool: &PgPool,
        range: &DateRange,
        plan_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM subscriptions \
             WHERE status <> 'trialing' \
               AND started_at >= $1 AND started_at <= $2 \
               AND ($3::BIGINT IS NULL OR plan_id = $3)",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(plan_id)
        .fetch_one(pool)
        .await
    }

    /// Subscriptions cancelled within the range.
    pub async fn count_cancelled_subscriptions(
        pool: &PgPool,
        range: &DateRange,
        plan_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM subscriptions \
             WHERE cancelled_at >= $1 AND cancelled_at <= $2 \
               AND ($3::BIGINT IS NULL OR plan_id = $3)",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(plan_id)
        .fetch_one(pool)
        .await
    }

    /// Subscriptions active at `at`, grouped by plan.
    pub async fn subscriptions_by_plan(
        pool: &PgPool,
        at: Timestamp,
        plan_id: Option<DbId>,
    ) -> Result<Vec<PlanCount>, sqlx::Error> {
        let query = format!(
            "SELECT sp.id AS plan_id, sp.name AS plan_name, sp.tier, COUNT(*) AS count \
             FROM subscriptions s \
             LEFT JOIN subscription_plans sp ON sp.id = s.plan_id \
             WHERE {} AND ($2::BIGINT IS NULL OR s.plan_id = $2) \
             GROUP BY sp.id, sp.name, sp.tier \
             ORDER BY count DESC, sp.id",
            active_at("$1")
        );
        sqlx::query_as::<_, PlanCount>(&query)
            .bind(at)
            .bind(plan_id)
            .fetch_all(pool)
            .await
    }

    /// All subscriptions grouped by their stored status.
    pub async fn subscriptions_by_status(
        pool: &PgPool,
        plan_id: Option<DbId>,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM subscriptions \
             WHERE ($1::BIGINT IS NULL OR plan_id = $1) \
             GROUP BY status ORDER BY status",
        )
        .bind(plan_id)
        .fetch_all(pool)
        .await
    }

    /// Starting, churned, new and ending subscription counts for a range.
    pub async fn churn_counts(
        pool: &PgPool,
        range: &DateRange,
        plan_id: Option<DbId>,
    ) -> Result<ChurnCounts, sqlx::Error> {
        let starting = active_at("$1");
        let ending = active_at("$2");
        let query = format!(
            "SELECT \
                COUNT(*) FILTER (WHERE {starting}) AS starting, \
                COUNT(*) FILTER (WHERE {starting} \
                    AND s.cancelled_at >= $1 AND s.cancelled_at <= $2) AS churned, \
                COUNT(*) FILTER (WHERE s.status <> 'trialing' \
                    AND s.started_at >= $1 AND s.started_at <= $2) AS new_subscriptions, \
                COUNT(*) FILTER (WHERE {ending}) AS ending \
             FROM subscriptions s \
             WHERE ($3::BIGINT IS NULL OR s.plan_id = $3)"
        );
        sqlx::query_as::<_, ChurnCounts>(&query)
            .bind(range.from)
            .bind(range.to)
            .bind(plan_id)
            .fetch_one(pool)
            .await
    }

    /// Active subscription count and monthly-normalized recurring revenue at
    /// each instant, in the order given.
    ///
    /// Yearly plans contribute a twelfth of their price. Subscriptions with
    /// no plan contribute [`FALLBACK_MONTHLY_PRICE_CENTS`].
    pub async fn recurring_at(
        pool: &PgPool,
        instants: &[Timestamp],
    ) -> Result<Vec<RecurringAt>, sqlx::Error> {
        let query = format!(
            "SELECT m.instant AS measured_at, \
                    COUNT(s.id) AS active_subscriptions, \
                    COALESCE(SUM(CASE \
                        WHEN s.id IS NULL THEN 0 \
                        WHEN sp.id IS NULL THEN $2::FLOAT8 \
                        WHEN sp.billing_interval = 'year' THEN sp.price_cents::FLOAT8 / 12 \
                        ELSE sp.price_cents::FLOAT8 \
                    END), 0)::FLOAT8 AS recurring_cents \
             FROM unnest($1::TIMESTAMPTZ[]) WITH ORDINALITY AS m(instant, ord) \
             LEFT JOIN subscriptions s ON {} \
             LEFT JOIN subscription_plans sp ON sp.id = s.plan_id \
             GROUP BY m.instant, m.ord \
             ORDER BY m.ord",
            active_at("m.instant")
        );
        sqlx::query_as::<_, RecurringAt>(&query)
            .bind(instants)
            .bind(FALLBACK_MONTHLY_PRICE_CENTS as f64)
            .fetch_all(pool)
            .await
    }

    /// Monthly signup cohorts between `since` and `now`, each with the number
    /// of its users holding a subscription active at `now`. Months without
    /// signups are omitted.
    pub async fn signup_cohorts(
        pool: &PgPool,
        since: Timestamp,
        now: Timestamp,
    ) -> Result<Vec<SignupCohort>, sqlx::Error> {
        let query = format!(
            "SELECT to_char(u.created_at AT TIME ZONE 'UTC', 'YYYY-MM') AS cohort, \
                    COUNT(*) AS users, \
                    SUM(CASE WHEN EXISTS ( \
                        SELECT 1 FROM subscriptions s WHERE s.user_id = u.id AND {} \
                    ) THEN 1 ELSE 0 END)::BIGINT AS retained \
             FROM users u \
             WHERE u.created_at >= $1 AND u.created_at <= $2 \
             GROUP BY 1 ORDER BY 1",
            active_at("$2")
        );
        sqlx::query_as::<_, SignupCohort>(&query)
            .bind(since)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// Program, class and meditation totals with published counts.
    pub async fn content_totals(
        pool: &PgPool,
        instructor_id: Option<DbId>,
    ) -> Result<ContentTotals, sqlx::Error> {
        sqlx::query_as::<_, ContentTotals>(
            "SELECT p.total AS programs, p.published AS published_programs, \
                    c.total AS classes, c.published AS published_classes, \
                    m.total AS meditations, m.published AS published_meditations \
             FROM \
                (SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE is_published) AS published \
                 FROM programs WHERE ($1::BIGINT IS NULL OR instructor_id = $1)) p \
             CROSS JOIN \
                (SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE is_published) AS published \
                 FROM classes WHERE ($1::BIGINT IS NULL OR instructor_id = $1)) c \
             CROSS JOIN \
                (SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE is_published) AS published \
                 FROM meditations WHERE ($1::BIGINT IS NULL OR instructor_id = $1)) m",
        )
        .bind(instructor_id)
        .fetch_one(pool)
        .await
    }

    /// Content items created within the range.
    pub async fn content_created(
        pool: &PgPool,
        range: &DateRange,
        instructor_id: Option<DbId>,
    ) -> Result<ContentCreated, sqlx::Error> {
        sqlx::query_as::<_, ContentCreated>(
            "SELECT \
                (SELECT COUNT(*) FROM programs \
                 WHERE created_at >= $1 AND created_at <= $2 \
                   AND ($3::BIGINT IS NULL OR instructor_id = $3)) AS programs, \
                (SELECT COUNT(*) FROM classes \
                 WHERE created_at >= $1 AND created_at <= $2 \
                   AND ($3::BIGINT IS NULL OR instructor_id = $3)) AS classes, \
                (SELECT COUNT(*) FROM meditations \
                 WHERE created_at >= $1 AND created_at <= $2 \
                   AND ($3::BIGINT IS NULL OR instructor_id = $3)) AS meditations",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(instructor_id)
        .fetch_one(pool)
        .await
    }

    /// Classes ranked by video progress activity within the range.
    pub async fn top_classes(
        pool: &PgPool,
        range: &DateRange,
        instructor_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<TopClass>, sqlx::Error> {
        sqlx::query_as::<_, TopClass>(
            "SELECT c.id AS class_id, c.title, i.display_name AS instructor_name, \
                    COUNT(vp.id) AS views, \
                    COUNT(vp.id) FILTER (WHERE vp.completed) AS completions \
             FROM classes c \
             JOIN instructors i ON i.id = c.instructor_id \
             JOIN video_progress vp ON vp.class_id = c.id \
                AND vp.updated_at >= $1 AND vp.updated_at <= $2 \
             WHERE ($3::BIGINT IS NULL OR c.instructor_id = $3) \
             GROUP BY c.id, c.title, i.display_name \
             ORDER BY views DESC, c.id \
             LIMIT $4",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(instructor_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Engagement
    // -----------------------------------------------------------------------

    /// Video progress activity within the range.
    pub async fn engagement_totals(
        pool: &PgPool,
        range: &DateRange,
        instructor_id: Option<DbId>,
    ) -> Result<EngagementTotals, sqlx::Error> {
        sqlx::query_as::<_, EngagementTotals>(
            "SELECT COUNT(DISTINCT vp.user_id) AS active_learners, \
                    COALESCE(SUM(vp.watched_seconds), 0)::BIGINT AS watch_seconds, \
                    COALESCE(AVG(vp.progress_percent), 0)::FLOAT8 AS average_progress, \
                    COUNT(*) AS started_classes, \
                    COUNT(*) FILTER (WHERE vp.completed) AS completed_classes \
             FROM video_progress vp \
             JOIN classes c ON c.id = vp.class_id \
             WHERE vp.updated_at >= $1 AND vp.updated_at <= $2 \
               AND ($3::BIGINT IS NULL OR c.instructor_id = $3)",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(instructor_id)
        .fetch_one(pool)
        .await
    }

    /// Planner entries scheduled within the range.
    pub async fn planner_counts(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<CompletionCounts, sqlx::Error> {
        sqlx::query_as::<_, CompletionCounts>(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE completed) AS completed \
             FROM planner_entries \
             WHERE scheduled_for >= $1 AND scheduled_for <= $2",
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_one(pool)
        .await
    }

    /// Challenge enrollments made within the range.
    pub async fn challenge_counts(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<CompletionCounts, sqlx::Error> {
        sqlx::query_as::<_, CompletionCounts>(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE completed) AS completed \
             FROM challenge_enrollments \
             WHERE enrolled_at >= $1 AND enrolled_at <= $2",
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_one(pool)
        .await
    }

    /// Distinct learners with video activity per UTC day.
    pub async fn daily_active_learners(
        pool: &PgPool,
        range: &DateRange,
        instructor_id: Option<DbId>,
    ) -> Result<Vec<DailyCount>, sqlx::Error> {
        sqlx::query_as::<_, DailyCount>(
            "SELECT to_char(vp.updated_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day, \
                    COUNT(DISTINCT vp.user_id) AS count \
             FROM video_progress vp \
             JOIN classes c ON c.id = vp.class_id \
             WHERE vp.updated_at >= $1 AND vp.updated_at <= $2 \
               AND ($3::BIGINT IS NULL OR c.instructor_id = $3) \
             GROUP BY 1 ORDER BY 1",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(instructor_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Instructors
    // -----------------------------------------------------------------------

    /// Per-instructor catalog size, views and completions in the range, and
    /// payouts created in the range. Ranked by views.
    ///
    /// `instructor_id` narrows to one instructor; `limit = None` returns all.
    pub async fn instructor_stats(
        pool: &PgPool,
        range: &DateRange,
        instructor_id: Option<DbId>,
        limit: Option<i64>,
    ) -> Result<Vec<InstructorStats>, sqlx::Error> {
        sqlx::query_as::<_, InstructorStats>(
            "SELECT i.id AS instructor_id, i.display_name, \
                (SELECT COUNT(*) FROM programs p WHERE p.instructor_id = i.id) AS programs, \
                (SELECT COUNT(*) FROM classes c WHERE c.instructor_id = i.id) AS classes, \
                (SELECT COUNT(*) FROM meditations m WHERE m.instructor_id = i.id) AS meditations, \
                (SELECT COUNT(*) FROM video_progress vp \
                    JOIN classes c ON c.id = vp.class_id \
                  WHERE c.instructor_id = i.id \
                    AND vp.updated_at >= $1 AND vp.updated_at <= $2) AS views, \
                (SELECT COUNT(*) FROM video_progress vp \
                    JOIN classes c ON c.id = vp.class_id \
                  WHERE c.instructor_id = i.id AND vp.completed \
                    AND vp.updated_at >= $1 AND vp.updated_at <= $2) AS completions, \
                (SELECT COALESCE(SUM(ip.amount_cents), 0)::BIGINT FROM instructor_payouts ip \
                  WHERE ip.instructor_id = i.id \
                    AND ip.created_at >= $1 AND ip.created_at <= $2) AS payouts_cents \
             FROM instructors i \
             WHERE ($3::BIGINT IS NULL OR i.id = $3) \
             ORDER BY views DESC, i.id \
             LIMIT $4",
        )
        .bind(range.from)
        .bind(range.to)
        .bind(instructor_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Realtime and comparison
    // -----------------------------------------------------------------------

    /// Activity since `since`.
    pub async fn realtime_counts(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<RealtimeCounts, sqlx::Error> {
        sqlx::query_as::<_, RealtimeCounts>(
            "SELECT \
                (SELECT COUNT(*) FROM users WHERE created_at >= $1) AS new_users, \
                (SELECT COUNT(DISTINCT user_id) FROM video_progress \
                  WHERE updated_at >= $1) AS active_viewers, \
                (SELECT COUNT(*) FROM payments \
                  WHERE status = 'succeeded' AND paid_at >= $1) AS payments, \
                (SELECT COALESCE(SUM(amount_cents), 0)::BIGINT FROM payments \
                  WHERE status = 'succeeded' AND paid_at >= $1) AS revenue_cents, \
                (SELECT COUNT(*) FROM subscriptions \
                  WHERE status <> 'trialing' AND started_at >= $1) AS new_subscriptions",
        )
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// The raw value of a comparison metric over one period: revenue in
    /// cents, new users, or new subscriptions.
    pub async fn metric_value(
        pool: &PgPool,
        metric: ComparisonMetric,
        range: &DateRange,
    ) -> Result<i64, sqlx::Error> {
        match metric {
            ComparisonMetric::Revenue => {
                let totals =
                    Self::revenue_totals(pool, range, &AnalyticsFilters::default()).await?;
                Ok(totals.total_cents)
            }
            ComparisonMetric::Users => Self::count_new_users(pool, range, None).await,
            ComparisonMetric::Subscriptions => {
                Self::count_new_subscriptions(pool, range, None).await
            }
        }
    }
}
