//! Access-token primitives.
//!
//! Tokens are issued by the platform's auth service; this service only
//! validates them. [`jwt::generate_access_token`] exists for tooling and
//! tests.

pub mod jwt;
