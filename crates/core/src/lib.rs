//! Domain logic for the YogaHub reporting service.
//!
//! This crate has no database dependencies. Date ranges, metric formulas,
//! widget descriptors and default dashboard layout planning live here so
//! they can be unit tested in isolation; `yogahub-db` and `yogahub-api`
//! feed them data.

pub mod date_range;
pub mod error;
pub mod metrics;
pub mod roles;
pub mod types;
pub mod widget;
