//! Service layer: composes repository queries into reports and enforces
//! dashboard rules. Handlers stay thin wrappers around these functions.

pub mod analytics;
pub mod dashboard;
