//! Repository tests for the widget catalog and per-user placements.

use assert_matches::assert_matches;
use sqlx::PgPool;
use yogahub_core::widget::{plan_default_layout, GridPosition, LayoutCandidate};
use yogahub_db::models::dashboard::{LayoutItem, LayoutUpdateOutcome, UpdatePlacement};
use yogahub_db::models::widget::{CreateWidget, UpdateWidget};
use yogahub_db::repositories::{DashboardWidgetRepo, WidgetRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, email: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (email, display_name) VALUES ($1, 'Test User') RETURNING id",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

async fn default_candidates(pool: &PgPool) -> Vec<LayoutCandidate> {
    WidgetRepo::list_defaults(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|w| LayoutCandidate {
            widget_id: w.id,
            data_source: w.data_source,
            default_width: w.default_width,
            default_height: w.default_height,
        })
        .collect()
}

fn new_widget(name: &str) -> CreateWidget {
    CreateWidget {
        name: name.to_string(),
        description: None,
        widget_type: "NUMBER".to_string(),
        data_source: "total_users".to_string(),
        chart_config: None,
        default_width: None,
        default_height: None,
        is_default: None,
        is_active: None,
    }
}

fn pos(x: i32, y: i32, width: i32, height: i32) -> GridPosition {
    GridPosition { x, y, width, height }
}

// ---------------------------------------------------------------------------
// Widget catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_widget_applies_defaults(pool: PgPool) {
    let widget = WidgetRepo::create(&pool, &new_widget("Signups Today"))
        .await
        .unwrap();

    assert_eq!(widget.default_width, 4);
    assert_eq!(widget.default_height, 3);
    assert!(!widget.is_default);
    assert!(widget.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_widget_returns_none(pool: PgPool) {
    let result = WidgetRepo::update(&pool, 999_999, &UpdateWidget::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inactive_widget_hidden_from_catalog(pool: PgPool) {
    let widget = WidgetRepo::create(&pool, &new_widget("Hidden")).await.unwrap();
    let update = UpdateWidget {
        is_active: Some(false),
        ..Default::default()
    };
    WidgetRepo::update(&pool, widget.id, &update).await.unwrap();

    let active = WidgetRepo::list_active(&pool).await.unwrap();
    assert!(active.iter().all(|w| w.id != widget.id));

    let all = WidgetRepo::list_all(&pool).await.unwrap();
    assert!(all.iter().any(|w| w.id == widget.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_widget_removes_placements(pool: PgPool) {
    let alice = create_user(&pool, "alice@test.com").await;
    let bob = create_user(&pool, "bob@test.com").await;
    let widget = WidgetRepo::create(&pool, &new_widget("Shared")).await.unwrap();

    DashboardWidgetRepo::add(&pool, alice, widget.id, &pos(0, 0, 3, 2), None)
        .await
        .unwrap();
    DashboardWidgetRepo::add(&pool, bob, widget.id, &pos(0, 0, 3, 2), None)
        .await
        .unwrap();

    let removed = WidgetRepo::delete(&pool, widget.id).await.unwrap();
    assert_eq!(removed, Some(2));

    assert!(WidgetRepo::find_by_id(&pool, widget.id).await.unwrap().is_none());
    assert_eq!(
        DashboardWidgetRepo::count_for_widget(&pool, widget.id)
            .await
            .unwrap(),
        0
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_missing_widget_returns_none(pool: PgPool) {
    assert_eq!(WidgetRepo::delete(&pool, 999_999).await.unwrap(), None);
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seed_places_each_default_once(pool: PgPool) {
    let user = create_user(&pool, "seed@test.com").await;
    let planned = plan_default_layout(&default_candidates(&pool).await);

    let first = DashboardWidgetRepo::seed(&pool, user, &planned).await.unwrap();
    assert_eq!(first, 8);

    // Seeding again (a racing first visit) inserts nothing.
    let second = DashboardWidgetRepo::seed(&pool, user, &planned).await.unwrap();
    assert_eq!(second, 0);

    let placements = DashboardWidgetRepo::list_for_user(&pool, user).await.unwrap();
    assert_eq!(placements.len(), 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_seed_does_not_duplicate(pool: PgPool) {
    let user = create_user(&pool, "race@test.com").await;
    let planned = plan_default_layout(&default_candidates(&pool).await);

    let (a, b) = tokio::join!(
        DashboardWidgetRepo::seed(&pool, user, &planned),
        DashboardWidgetRepo::seed(&pool, user, &planned),
    );
    assert_eq!(a.unwrap() + b.unwrap(), 8);

    let placements = DashboardWidgetRepo::list_for_user(&pool, user).await.unwrap();
    assert_eq!(placements.len(), 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_all_discards_customizations(pool: PgPool) {
    let user = create_user(&pool, "reset@test.com").await;
    let extra = WidgetRepo::create(&pool, &new_widget("Extra")).await.unwrap();
    DashboardWidgetRepo::add(&pool, user, extra.id, &pos(0, 20, 3, 2), None)
        .await
        .unwrap();

    let planned = plan_default_layout(&default_candidates(&pool).await);
    DashboardWidgetRepo::replace_all(&pool, user, &planned)
        .await
        .unwrap();

    let placements = DashboardWidgetRepo::list_for_user(&pool, user).await.unwrap();
    assert_eq!(placements.len(), 8);
    assert!(placements.iter().all(|p| p.widget_id != extra.id));
}

// ---------------------------------------------------------------------------
// Placements
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_add_violates_unique_constraint(pool: PgPool) {
    let user = create_user(&pool, "dup@test.com").await;
    let widget = WidgetRepo::create(&pool, &new_widget("Once")).await.unwrap();

    DashboardWidgetRepo::add(&pool, user, widget.id, &pos(0, 0, 3, 2), None)
        .await
        .unwrap();
    let err = DashboardWidgetRepo::add(&pool, user, widget.id, &pos(3, 0, 3, 2), None)
        .await
        .unwrap_err();

    assert_matches!(err, sqlx::Error::Database(ref db)
        if db.constraint() == Some("uq_user_dashboard_widgets_user_widget"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_placement_keeps_unset_fields(pool: PgPool) {
    let user = create_user(&pool, "patch@test.com").await;
    let widget = WidgetRepo::create(&pool, &new_widget("Patchable")).await.unwrap();
    DashboardWidgetRepo::add(&pool, user, widget.id, &pos(0, 0, 3, 2), None)
        .await
        .unwrap();

    let update = UpdatePlacement {
        is_visible: Some(false),
        ..Default::default()
    };
    let row = DashboardWidgetRepo::update_placement(&pool, user, widget.id, &update)
        .await
        .unwrap()
        .unwrap();

    assert!(!row.is_visible);
    assert_eq!(row.position(), pos(0, 0, 3, 2));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_layout_update_is_all_or_nothing(pool: PgPool) {
    let user = create_user(&pool, "layout@test.com").await;
    let placed = WidgetRepo::create(&pool, &new_widget("Placed")).await.unwrap();
    let unplaced = WidgetRepo::create(&pool, &new_widget("Unplaced")).await.unwrap();
    DashboardWidgetRepo::add(&pool, user, placed.id, &pos(0, 0, 3, 2), None)
        .await
        .unwrap();

    let items = vec![
        LayoutItem {
            widget_id: placed.id,
            position: pos(6, 4, 4, 4),
            is_visible: None,
        },
        LayoutItem {
            widget_id: unplaced.id,
            position: pos(0, 0, 3, 2),
            is_visible: None,
        },
    ];

    let outcome = DashboardWidgetRepo::update_layout(&pool, user, &items)
        .await
        .unwrap();
    assert_matches!(outcome, LayoutUpdateOutcome::MissingPlacement(id) if id == unplaced.id);

    // The first item's move was rolled back.
    let row = DashboardWidgetRepo::find_for_user(&pool, user, placed.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.position(), pos(0, 0, 3, 2));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_layout_update_applies_every_item(pool: PgPool) {
    let user = create_user(&pool, "layout2@test.com").await;
    let a = WidgetRepo::create(&pool, &new_widget("A")).await.unwrap();
    let b = WidgetRepo::create(&pool, &new_widget("B")).await.unwrap();
    DashboardWidgetRepo::add(&pool, user, a.id, &pos(0, 0, 3, 2), None)
        .await
        .unwrap();
    DashboardWidgetRepo::add(&pool, user, b.id, &pos(3, 0, 3, 2), None)
        .await
        .unwrap();

    let items = vec![
        LayoutItem {
            widget_id: a.id,
            position: pos(3, 0, 3, 2),
            is_visible: Some(false),
        },
        LayoutItem {
            widget_id: b.id,
            position: pos(0, 0, 3, 2),
            is_visible: None,
        },
    ];

    let outcome = DashboardWidgetRepo::update_layout(&pool, user, &items)
        .await
        .unwrap();
    let rows = match outcome {
        LayoutUpdateOutcome::Applied(rows) => rows,
        other => panic!("expected Applied, got {other:?}"),
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].position(), pos(3, 0, 3, 2));
    assert!(!rows[0].is_visible);
    assert!(rows[1].is_visible);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_remove_reports_missing_placement(pool: PgPool) {
    let user = create_user(&pool, "remove@test.com").await;
    let widget = WidgetRepo::create(&pool, &new_widget("Removable")).await.unwrap();
    DashboardWidgetRepo::add(&pool, user, widget.id, &pos(0, 0, 3, 2), None)
        .await
        .unwrap();

    assert!(DashboardWidgetRepo::remove(&pool, user, widget.id).await.unwrap());
    assert!(!DashboardWidgetRepo::remove(&pool, user, widget.id).await.unwrap());
}
