//! Row models and DTOs.
//!
//! Each submodule contains `FromRow` + `Serialize` structs matching query
//! results and `Deserialize` DTOs for request payloads. Wire keys are
//! camelCase.

pub mod analytics;
pub mod dashboard;
pub mod widget;
