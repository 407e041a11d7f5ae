//! Dashboard widget descriptors, grid rules and default layout planning.
//!
//! Widgets are stored with free-form `widget_type` and `data_source`
//! strings; the enums here are the set the service knows how to render and
//! resolve. The default layout places the eight default widgets at fixed
//! grid coordinates on a 12-column grid.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of columns on the dashboard grid.
pub const GRID_COLUMNS: i32 = 12;

/// Tallest widget allowed, in grid rows.
pub const MAX_WIDGET_HEIGHT: i32 = 12;

/// Rows available on a dashboard. Every cell must end at or above this row.
pub const MAX_GRID_ROWS: i32 = 1000;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a widget's data is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WidgetType {
    Number,
    Chart,
    List,
    Table,
}

impl WidgetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "NUMBER",
            Self::Chart => "CHART",
            Self::List => "LIST",
            Self::Table => "TABLE",
        }
    }
}

impl FromStr for WidgetType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NUMBER" => Ok(Self::Number),
            "CHART" => Ok(Self::Chart),
            "LIST" => Ok(Self::List),
            "TABLE" => Ok(Self::Table),
            other => Err(CoreError::Validation(format!(
                "Unknown widget type '{other}': expected NUMBER, CHART, LIST or TABLE"
            ))),
        }
    }
}

/// Query a widget resolves its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    TotalUsers,
    ActiveSubscriptions,
    MonthlyRevenue,
    Mrr,
    RevenueChart,
    SubscriptionBreakdown,
    TopClasses,
    RecentSignups,
    NewUsersChart,
    EngagementSummary,
    ChurnRate,
    TopInstructors,
}

impl DataSource {
    pub const ALL: [DataSource; 12] = [
        Self::TotalUsers,
        Self::ActiveSubscriptions,
        Self::MonthlyRevenue,
        Self::Mrr,
        Self::RevenueChart,
        Self::SubscriptionBreakdown,
        Self::TopClasses,
        Self::RecentSignups,
        Self::NewUsersChart,
        Self::EngagementSummary,
        Self::ChurnRate,
        Self::TopInstructors,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TotalUsers => "total_users",
            Self::ActiveSubscriptions => "active_subscriptions",
            Self::MonthlyRevenue => "monthly_revenue",
            Self::Mrr => "mrr",
            Self::RevenueChart => "revenue_chart",
            Self::SubscriptionBreakdown => "subscription_breakdown",
            Self::TopClasses => "top_classes",
            Self::RecentSignups => "recent_signups",
            Self::NewUsersChart => "new_users_chart",
            Self::EngagementSummary => "engagement_summary",
            Self::ChurnRate => "churn_rate",
            Self::TopInstructors => "top_instructors",
        }
    }
}

impl FromStr for DataSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown data source '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Grid positions
// ---------------------------------------------------------------------------

/// A widget's cell on the dashboard grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_fits_grid"))]
pub struct GridPosition {
    #[validate(range(min = 0))]
    pub x: i32,
    #[validate(range(min = 0))]
    pub y: i32,
    #[validate(range(min = 1, max = 12))]
    pub width: i32,
    #[validate(range(min = 1, max = 12))]
    pub height: i32,
}

fn validate_fits_grid(position: &GridPosition) -> Result<(), ValidationError> {
    if position.x.saturating_add(position.width) > GRID_COLUMNS {
        let mut err = ValidationError::new("exceeds_grid");
        err.message = Some(format!("x + width must not exceed {GRID_COLUMNS} columns").into());
        return Err(err);
    }
    if position.y.saturating_add(position.height) > MAX_GRID_ROWS {
        let mut err = ValidationError::new("exceeds_grid");
        err.message = Some(format!("y + height must not exceed {MAX_GRID_ROWS} rows").into());
        return Err(err);
    }
    Ok(())
}

impl GridPosition {
    /// Validate against the grid rules, mapping failures to [`CoreError`].
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate().map_err(CoreError::from)
    }

    /// First row below this cell.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

/// First free row below every existing cell.
pub fn next_free_row(existing: &[GridPosition]) -> i32 {
    existing.iter().map(GridPosition::bottom).max().unwrap_or(0)
}

/// Position for a widget appended under the current layout, using its
/// default size clamped to the grid. Fails when no rows are left below the
/// layout.
pub fn append_position(
    existing: &[GridPosition],
    width: i32,
    height: i32,
) -> Result<GridPosition, CoreError> {
    let position = GridPosition {
        x: 0,
        y: next_free_row(existing),
        width: width.clamp(1, GRID_COLUMNS),
        height: height.clamp(1, MAX_WIDGET_HEIGHT),
    };
    position.check().map_err(|_| {
        CoreError::Validation(format!(
            "No room below the current layout: dashboards are limited to {MAX_GRID_ROWS} rows"
        ))
    })?;
    Ok(position)
}

// ---------------------------------------------------------------------------
// Default layout
// ---------------------------------------------------------------------------

/// Fixed slot for a default widget.
#[derive(Debug, Clone, Copy)]
pub struct DefaultSlot {
    pub data_source: DataSource,
    pub position: GridPosition,
}

const fn slot(data_source: DataSource, x: i32, y: i32, width: i32, height: i32) -> DefaultSlot {
    DefaultSlot {
        data_source,
        position: GridPosition {
            x,
            y,
            width,
            height,
        },
    }
}

/// The default dashboard: four stat tiles, two charts, two lists.
pub const DEFAULT_LAYOUT: [DefaultSlot; 8] = [
    slot(DataSource::TotalUsers, 0, 0, 3, 2),
    slot(DataSource::ActiveSubscriptions, 3, 0, 3, 2),
    slot(DataSource::MonthlyRevenue, 6, 0, 3, 2),
    slot(DataSource::Mrr, 9, 0, 3, 2),
    slot(DataSource::RevenueChart, 0, 2, 8, 4),
    slot(DataSource::SubscriptionBreakdown, 8, 2, 4, 4),
    slot(DataSource::TopClasses, 0, 6, 6, 4),
    slot(DataSource::RecentSignups, 6, 6, 6, 4),
];

/// A default widget eligible for seeding.
#[derive(Debug, Clone)]
pub struct LayoutCandidate {
    pub widget_id: DbId,
    pub data_source: String,
    pub default_width: i32,
    pub default_height: i32,
}

/// A placement to insert when seeding a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedPlacement {
    pub widget_id: DbId,
    pub position: GridPosition,
}

/// Assign grid cells to the default widgets.
///
/// Widgets whose data source has a slot in [`DEFAULT_LAYOUT`] take that
/// slot; the rest (and any second widget competing for a taken slot) are
/// stacked below until the grid runs out of rows. Each widget id appears at
/// most once.
pub fn plan_default_layout(candidates: &[LayoutCandidate]) -> Vec<PlannedPlacement> {
    let mut seen_widgets = HashSet::new();
    let mut used_sources = HashSet::new();
    let mut planned = Vec::with_capacity(candidates.len());
    let mut overflow = Vec::new();

    for candidate in candidates {
        if !seen_widgets.insert(candidate.widget_id) {
            continue;
        }
        let slot = DataSource::from_str(&candidate.data_source)
            .ok()
            .and_then(|source| DEFAULT_LAYOUT.iter().find(|s| s.data_source == source));

        match slot {
            Some(slot) if used_sources.insert(slot.data_source) => planned.push(PlannedPlacement {
                widget_id: candidate.widget_id,
                position: slot.position,
            }),
            _ => overflow.push(candidate),
        }
    }

    for candidate in overflow {
        let taken: Vec<GridPosition> = planned.iter().map(|p| p.position).collect();
        let Ok(position) =
            append_position(&taken, candidate.default_width, candidate.default_height)
        else {
            break;
        };
        planned.push(PlannedPlacement {
            widget_id: candidate.widget_id,
            position,
        });
    }

    planned
}
