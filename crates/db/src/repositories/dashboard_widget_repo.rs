//! Repository for the `user_dashboard_widgets` table.
//!
//! Placements are unique per `(user_id, widget_id)`. Seeding, reset and
//! batch layout updates each run in a single transaction.

use sqlx::PgPool;
use yogahub_core::types::DbId;
use yogahub_core::widget::{GridPosition, PlannedPlacement};

use crate::models::dashboard::{
    DashboardWidgetView, LayoutItem, LayoutUpdateOutcome, UpdatePlacement, UserDashboardWidget,
};

/// Column list for `user_dashboard_widgets` queries.
const COLUMNS: &str = "\
    id, user_id, widget_id, position_x, position_y, width, height, \
    is_visible, config, created_at, updated_at";

/// Column list for placements joined with `widgets` (`udw` / `w`).
const VIEW_COLUMNS: &str = "\
    udw.id, udw.widget_id, w.name, w.description, w.widget_type, w.data_source, \
    w.chart_config, udw.position_x, udw.position_y, udw.width, udw.height, \
    udw.is_visible, udw.config, udw.created_at, udw.updated_at";

const INSERT_IGNORING_DUPLICATES: &str = "\
    INSERT INTO user_dashboard_widgets (user_id, widget_id, position_x, position_y, width, height) \
    VALUES ($1, $2, $3, $4, $5, $6) \
    ON CONFLICT (user_id, widget_id) DO NOTHING";

/// Provides data access for per-user widget placements.
pub struct DashboardWidgetRepo;

impl DashboardWidgetRepo {
    /// A user's placements of active widgets, top-left first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DashboardWidgetView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM user_dashboard_widgets udw \
             JOIN widgets w ON w.id = udw.widget_id \
             WHERE udw.user_id = $1 AND w.is_active \
             ORDER BY udw.position_y, udw.position_x, udw.id"
        );
        sqlx::query_as::<_, DashboardWidgetView>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// A single placement joined with its widget.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        widget_id: DbId,
    ) -> Result<Option<DashboardWidgetView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM user_dashboard_widgets udw \
             JOIN widgets w ON w.id = udw.widget_id \
             WHERE udw.user_id = $1 AND udw.widget_id = $2"
        );
        sqlx::query_as::<_, DashboardWidgetView>(&query)
            .bind(user_id)
            .bind(widget_id)
            .fetch_optional(pool)
            .await
    }

    /// Grid cells currently occupied on a user's dashboard.
    pub async fn positions_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<GridPosition>, sqlx::Error> {
        let rows: Vec<(i32, i32, i32, i32)> = sqlx::query_as(
            "SELECT position_x, position_y, width, height \
             FROM user_dashboard_widgets WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(x, y, width, height)| GridPosition {
                x,
                y,
                width,
                height,
            })
            .collect())
    }

    /// Insert planned placements, skipping widgets the user already has.
    ///
    /// Concurrent seeding of the same user is safe: the unique constraint
    /// turns the second insert of a pair into a no-op. Returns the number of
    /// rows inserted.
    pub async fn seed(
        pool: &PgPool,
        user_id: DbId,
        placements: &[PlannedPlacement],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for placement in placements {
            inserted += bind_placement(sqlx::query(INSERT_IGNORING_DUPLICATES), user_id, placement)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Remove every placement for the user and insert `placements` instead.
    pub async fn replace_all(
        pool: &PgPool,
        user_id: DbId,
        placements: &[PlannedPlacement],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM user_dashboard_widgets WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut inserted = 0;
        for placement in placements {
            inserted += bind_placement(sqlx::query(INSERT_IGNORING_DUPLICATES), user_id, placement)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Place a widget on a user's dashboard.
    ///
    /// A second placement of the same widget violates
    /// `uq_user_dashboard_widgets_user_widget`.
    pub async fn add(
        pool: &PgPool,
        user_id: DbId,
        widget_id: DbId,
        position: &GridPosition,
        config: Option<&serde_json::Value>,
    ) -> Result<UserDashboardWidget, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_dashboard_widgets \
                (user_id, widget_id, position_x, position_y, width, height, config) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserDashboardWidget>(&query)
            .bind(user_id)
            .bind(widget_id)
            .bind(position.x)
            .bind(position.y)
            .bind(position.width)
            .bind(position.height)
            .bind(config)
            .fetch_one(pool)
            .await
    }

    /// Patch one placement. Returns `None` if the widget is not placed.
    pub async fn update_placement(
        pool: &PgPool,
        user_id: DbId,
        widget_id: DbId,
        input: &UpdatePlacement,
    ) -> Result<Option<UserDashboardWidget>, sqlx::Error> {
        let query = format!(
            "UPDATE user_dashboard_widgets SET \
                position_x = COALESCE($3, position_x), \
                position_y = COALESCE($4, position_y), \
                width = COALESCE($5, width), \
                height = COALESCE($6, height), \
                is_visible = COALESCE($7, is_visible), \
                config = COALESCE($8, config) \
             WHERE user_id = $1 AND widget_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserDashboardWidget>(&query)
            .bind(user_id)
            .bind(widget_id)
            .bind(input.position.map(|p| p.x))
            .bind(input.position.map(|p| p.y))
            .bind(input.position.map(|p| p.width))
            .bind(input.position.map(|p| p.height))
            .bind(input.is_visible)
            .bind(&input.config)
            .fetch_optional(pool)
            .await
    }

    /// Apply a batch of position updates atomically.
    ///
    /// If any item names a widget the user has not placed, the transaction
    /// is rolled back and the offending widget id is reported.
    pub async fn update_layout(
        pool: &PgPool,
        user_id: DbId,
        items: &[LayoutItem],
    ) -> Result<LayoutUpdateOutcome, sqlx::Error> {
        let query = format!(
            "UPDATE user_dashboard_widgets SET \
                position_x = $3, position_y = $4, width = $5, height = $6, \
                is_visible = COALESCE($7, is_visible) \
             WHERE user_id = $1 AND widget_id = $2 \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut updated = Vec::with_capacity(items.len());

        for item in items {
            let row = sqlx::query_as::<_, UserDashboardWidget>(&query)
                .bind(user_id)
                .bind(item.widget_id)
                .bind(item.position.x)
                .bind(item.position.y)
                .bind(item.position.width)
                .bind(item.position.height)
                .bind(item.is_visible)
                .fetch_optional(&mut *tx)
                .await?;

            match row {
                Some(row) => updated.push(row),
                None => {
                    tx.rollback().await?;
                    return Ok(LayoutUpdateOutcome::MissingPlacement(item.widget_id));
                }
            }
        }

        tx.commit().await?;
        Ok(LayoutUpdateOutcome::Applied(updated))
    }

    /// Remove a placement. Returns `true` if a row was deleted.
    pub async fn remove(
        pool: &PgPool,
        user_id: DbId,
        widget_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM user_dashboard_widgets WHERE user_id = $1 AND widget_id = $2")
                .bind(user_id)
                .bind(widget_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of placements referencing a widget, across all users.
    pub async fn count_for_widget(pool: &PgPool, widget_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_dashboard_widgets WHERE widget_id = $1")
            .bind(widget_id)
            .fetch_one(pool)
            .await
    }
}

fn bind_placement<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    user_id: DbId,
    placement: &PlannedPlacement,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(user_id)
        .bind(placement.widget_id)
        .bind(placement.position.x)
        .bind(placement.position.y)
        .bind(placement.position.width)
        .bind(placement.position.height)
}
