//! Well-known role name constants.
//!
//! These must match the `chk_users_role` constraint in
//! `20250101000002_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_MEMBER: &str = "member";

/// All roles a user row may carry.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_INSTRUCTOR, ROLE_MEMBER];

/// Whether `role` is one of the known role names.
pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}
