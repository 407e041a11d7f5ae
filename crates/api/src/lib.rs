//! YogaHub reporting API.
//!
//! Admin analytics reports and per-user widget dashboards over the
//! platform's PostgreSQL database. The library is shared by the binary
//! entrypoint and the integration tests.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
