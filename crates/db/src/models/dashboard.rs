//! Per-user dashboard placements and layout DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yogahub_core::types::{DbId, Timestamp};
use yogahub_core::widget::GridPosition;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `user_dashboard_widgets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboardWidget {
    pub id: DbId,
    pub user_id: DbId,
    pub widget_id: DbId,
    pub position_x: i32,
    pub position_y: i32,
    pub width: i32,
    pub height: i32,
    pub is_visible: bool,
    pub config: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserDashboardWidget {
    pub fn position(&self) -> GridPosition {
        GridPosition {
            x: self.position_x,
            y: self.position_y,
            width: self.width,
            height: self.height,
        }
    }
}

/// A placement joined with its widget's catalog entry.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardWidgetView {
    pub id: DbId,
    pub widget_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub widget_type: String,
    pub data_source: String,
    pub chart_config: Option<serde_json::Value>,
    pub position_x: i32,
    pub position_y: i32,
    pub width: i32,
    pub height: i32,
    pub is_visible: bool,
    pub config: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// One entry of a batch layout update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    pub widget_id: DbId,
    pub position: GridPosition,
    pub is_visible: Option<bool>,
}

/// Body of `PUT /dashboard`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDashboardLayout {
    pub widgets: Vec<LayoutItem>,
}

/// Body of `POST /dashboard/widgets`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDashboardWidget {
    pub widget_id: DbId,
    pub position: Option<GridPosition>,
    pub config: Option<serde_json::Value>,
}

/// Body of `PATCH /dashboard/widgets/{widgetId}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlacement {
    pub position: Option<GridPosition>,
    pub is_visible: Option<bool>,
    pub config: Option<serde_json::Value>,
}

/// Result of a batch layout update.
#[derive(Debug)]
pub enum LayoutUpdateOutcome {
    /// Every placement was updated and the transaction committed.
    Applied(Vec<UserDashboardWidget>),
    /// The user has no placement for this widget; nothing was applied.
    MissingPlacement(DbId),
}
