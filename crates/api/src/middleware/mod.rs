//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role (analytics, widget catalog admin).
//! - [`rbac::RequireAuth`] -- Requires any authenticated user (dashboards).

pub mod auth;
pub mod rbac;
