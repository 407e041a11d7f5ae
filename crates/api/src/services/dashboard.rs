//! Dashboard and widget catalog operations.
//!
//! A user's dashboard is seeded lazily: the first fetch that finds no
//! placements inserts the default layout. Widget data is resolved by
//! dispatching on the widget's data source to an analytics query.

use std::str::FromStr;

use serde::Serialize;
use sqlx::PgPool;
use validator::Validate;
use yogahub_core::date_range::{month_start, DateRange};
use yogahub_core::error::CoreError;
use yogahub_core::metrics::{cents_to_major, round2};
use yogahub_core::types::{DbId, Timestamp};
use yogahub_core::widget::{
    append_position, plan_default_layout, DataSource, LayoutCandidate, PlannedPlacement,
    WidgetType,
};
use yogahub_db::models::analytics::AnalyticsFilters;
use yogahub_db::models::dashboard::{
    AddDashboardWidget, DashboardWidgetView, LayoutItem, LayoutUpdateOutcome, UpdatePlacement,
    UserDashboardWidget,
};
use yogahub_db::models::widget::{CreateWidget, UpdateWidget, Widget};
use yogahub_db::repositories::{AnalyticsRepo, DashboardWidgetRepo, WidgetRepo};

use crate::error::{AppError, AppResult};
use crate::services::analytics::{self, RevenuePoint, TopClassEntry, TOP_LIST_LIMIT};

/// Resolved data for one widget.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetData {
    pub widget_id: DbId,
    pub name: String,
    pub widget_type: String,
    pub data_source: String,
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

async fn default_plan(pool: &PgPool) -> AppResult<Vec<PlannedPlacement>> {
    let defaults = WidgetRepo::list_defaults(pool).await?;
    let candidates: Vec<LayoutCandidate> = defaults
        .into_iter()
        .map(|w| LayoutCandidate {
            widget_id: w.id,
            data_source: w.data_source,
            default_width: w.default_width,
            default_height: w.default_height,
        })
        .collect();
    Ok(plan_default_layout(&candidates))
}

/// The user's dashboard, seeding the default layout if it is empty.
pub async fn get_user_dashboard(
    pool: &PgPool,
    user_id: DbId,
) -> AppResult<Vec<DashboardWidgetView>> {
    let widgets = DashboardWidgetRepo::list_for_user(pool, user_id).await?;
    if !widgets.is_empty() {
        return Ok(widgets);
    }

    let plan = default_plan(pool).await?;
    let inserted = DashboardWidgetRepo::seed(pool, user_id, &plan).await?;
    tracing::info!(user_id, inserted, "Default dashboard seeded");

    Ok(DashboardWidgetRepo::list_for_user(pool, user_id).await?)
}

/// Apply a batch of position updates. Every position is validated before
/// anything is written; a placement missing from the user's dashboard
/// aborts the whole batch.
pub async fn update_dashboard_layout(
    pool: &PgPool,
    user_id: DbId,
    items: &[LayoutItem],
) -> AppResult<Vec<DashboardWidgetView>> {
    for item in items {
        item.position.check()?;
    }

    match DashboardWidgetRepo::update_layout(pool, user_id, items).await? {
        LayoutUpdateOutcome::Applied(rows) => {
            tracing::info!(user_id, updated = rows.len(), "Dashboard layout updated");
        }
        LayoutUpdateOutcome::MissingPlacement(widget_id) => {
            return Err(CoreError::NotFound {
                entity: "DashboardWidget",
                id: widget_id,
            }
            .into());
        }
    }

    Ok(DashboardWidgetRepo::list_for_user(pool, user_id).await?)
}

/// Place an active widget. Without a position it goes below the current
/// layout at its default size.
pub async fn add_widget(
    pool: &PgPool,
    user_id: DbId,
    input: &AddDashboardWidget,
) -> AppResult<DashboardWidgetView> {
    let widget = WidgetRepo::find_by_id(pool, input.widget_id)
        .await?
        .filter(|w| w.is_active)
        .ok_or(CoreError::NotFound {
            entity: "Widget",
            id: input.widget_id,
        })?;

    let position = match input.position {
        Some(position) => {
            position.check()?;
            position
        }
        None => {
            let taken = DashboardWidgetRepo::positions_for_user(pool, user_id).await?;
            append_position(&taken, widget.default_width, widget.default_height)?
        }
    };

    let placement =
        DashboardWidgetRepo::add(pool, user_id, widget.id, &position, input.config.as_ref())
            .await?;
    tracing::info!(
        user_id,
        widget_id = widget.id,
        placement_id = placement.id,
        "Widget added to dashboard",
    );

    DashboardWidgetRepo::find_for_user(pool, user_id, widget.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Placement vanished after insert".into()))
}

/// Reposition, resize, hide or reconfigure one placement.
pub async fn update_widget_placement(
    pool: &PgPool,
    user_id: DbId,
    widget_id: DbId,
    input: &UpdatePlacement,
) -> AppResult<UserDashboardWidget> {
    if let Some(position) = &input.position {
        position.check()?;
    }

    let placement = DashboardWidgetRepo::update_placement(pool, user_id, widget_id, input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "DashboardWidget",
            id: widget_id,
        })?;
    tracing::info!(user_id, widget_id, "Dashboard widget updated");
    Ok(placement)
}

pub async fn remove_widget(pool: &PgPool, user_id: DbId, widget_id: DbId) -> AppResult<()> {
    if !DashboardWidgetRepo::remove(pool, user_id, widget_id).await? {
        return Err(CoreError::NotFound {
            entity: "DashboardWidget",
            id: widget_id,
        }
        .into());
    }
    tracing::info!(user_id, widget_id, "Widget removed from dashboard");
    Ok(())
}

/// Drop every placement and restore the default layout in one transaction.
pub async fn reset_dashboard(
    pool: &PgPool,
    user_id: DbId,
) -> AppResult<Vec<DashboardWidgetView>> {
    let plan = default_plan(pool).await?;
    let inserted = DashboardWidgetRepo::replace_all(pool, user_id, &plan).await?;
    tracing::info!(user_id, inserted, "Dashboard reset to defaults");
    Ok(DashboardWidgetRepo::list_for_user(pool, user_id).await?)
}

// ---------------------------------------------------------------------------
// Widget data
// ---------------------------------------------------------------------------

fn to_data<T: Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::InternalError(e.to_string()))
}

/// Resolve a widget's payload for the given range and filters.
///
/// Point-in-time sources (`total_users`, `active_subscriptions`, `mrr`,
/// `recent_signups`, `subscription_breakdown`, `monthly_revenue`) ignore the
/// range.
pub async fn get_widget_data(
    pool: &PgPool,
    widget_id: DbId,
    range: &DateRange,
    filters: &AnalyticsFilters,
    now: Timestamp,
) -> AppResult<WidgetData> {
    let widget = WidgetRepo::find_by_id(pool, widget_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Widget",
            id: widget_id,
        })?;
    let source = DataSource::from_str(&widget.data_source)?;

    let data = match source {
        DataSource::TotalUsers => {
            let total = AnalyticsRepo::count_users(pool, filters.role.as_deref()).await?;
            serde_json::json!({ "value": total })
        }
        DataSource::ActiveSubscriptions => {
            let active =
                AnalyticsRepo::count_active_subscriptions(pool, now, filters.plan_id).await?;
            serde_json::json!({ "value": active })
        }
        DataSource::MonthlyRevenue => {
            let this_month = DateRange {
                from: month_start(now),
                to: now,
            };
            let totals = AnalyticsRepo::revenue_totals(pool, &this_month, filters).await?;
            serde_json::json!({
                "value": cents_to_major(totals.total_cents),
                "transactions": totals.transactions,
            })
        }
        DataSource::Mrr => {
            let current = AnalyticsRepo::recurring_at(pool, &[now]).await?;
            let (active, cents) = current
                .first()
                .map_or((0, 0.0), |r| (r.active_subscriptions, r.recurring_cents));
            serde_json::json!({
                "value": round2(cents / 100.0),
                "activeSubscriptions": active,
            })
        }
        DataSource::RevenueChart => {
            let daily = AnalyticsRepo::daily_revenue(pool, range, filters).await?;
            let points: Vec<RevenuePoint> = daily.into_iter().map(RevenuePoint::from).collect();
            to_data(&points)?
        }
        DataSource::SubscriptionBreakdown => {
            let by_plan = AnalyticsRepo::subscriptions_by_plan(pool, now, filters.plan_id).await?;
            to_data(&by_plan)?
        }
        DataSource::TopClasses => {
            let rows =
                AnalyticsRepo::top_classes(pool, range, filters.instructor_id, TOP_LIST_LIMIT)
                    .await?;
            let entries: Vec<TopClassEntry> = rows.into_iter().map(TopClassEntry::from).collect();
            to_data(&entries)?
        }
        DataSource::RecentSignups => {
            to_data(&AnalyticsRepo::recent_signups(pool, TOP_LIST_LIMIT).await?)?
        }
        DataSource::NewUsersChart => {
            to_data(&AnalyticsRepo::daily_signups(pool, range, filters.role.as_deref()).await?)?
        }
        DataSource::EngagementSummary => {
            to_data(&analytics::engagement_analytics(pool, range, filters).await?)?
        }
        DataSource::ChurnRate => {
            to_data(&analytics::churn_report(pool, range, filters.plan_id).await?)?
        }
        DataSource::TopInstructors => {
            let report =
                analytics::instructor_analytics(pool, range, Some(TOP_LIST_LIMIT)).await?;
            to_data(&report.instructors)?
        }
    };

    Ok(WidgetData {
        widget_id: widget.id,
        name: widget.name,
        widget_type: widget.widget_type,
        data_source: widget.data_source,
        data,
    })
}

// ---------------------------------------------------------------------------
// Widget catalog
// ---------------------------------------------------------------------------

/// Widgets users can add to their dashboard.
pub async fn list_catalog(pool: &PgPool) -> AppResult<Vec<Widget>> {
    Ok(WidgetRepo::list_active(pool).await?)
}

/// Every widget, including inactive ones.
pub async fn list_all_widgets(pool: &PgPool) -> AppResult<Vec<Widget>> {
    Ok(WidgetRepo::list_all(pool).await?)
}

pub async fn create_widget(pool: &PgPool, input: &CreateWidget) -> AppResult<Widget> {
    input.validate().map_err(CoreError::from)?;
    WidgetType::from_str(&input.widget_type)?;
    DataSource::from_str(&input.data_source)?;

    let widget = WidgetRepo::create(pool, input).await?;
    tracing::info!(widget_id = widget.id, name = %widget.name, "Widget created");
    Ok(widget)
}

pub async fn update_widget(pool: &PgPool, id: DbId, input: &UpdateWidget) -> AppResult<Widget> {
    input.validate().map_err(CoreError::from)?;
    if let Some(widget_type) = &input.widget_type {
        WidgetType::from_str(widget_type)?;
    }
    if let Some(data_source) = &input.data_source {
        DataSource::from_str(data_source)?;
    }

    let widget = WidgetRepo::update(pool, id, input)
        .await?
        .ok_or(CoreError::NotFound { entity: "Widget", id })?;
    tracing::info!(widget_id = id, "Widget updated");
    Ok(widget)
}

/// Delete a widget and every placement of it.
pub async fn delete_widget(pool: &PgPool, id: DbId) -> AppResult<()> {
    let removed_placements = WidgetRepo::delete(pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Widget", id })?;
    tracing::info!(widget_id = id, removed_placements, "Widget deleted");
    Ok(())
}
