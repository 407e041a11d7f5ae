//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod analytics_repo;
pub mod dashboard_widget_repo;
pub mod widget_repo;

pub use analytics_repo::AnalyticsRepo;
pub use dashboard_widget_repo::DashboardWidgetRepo;
pub use widget_repo::WidgetRepo;
