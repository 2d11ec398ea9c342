//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller behind a session-bound access token.
//! - [`rbac::RequireAdmin`] -- requires a superuser.
//! - [`rbac::RequireStaff`] -- requires a staff member or superuser.

pub mod auth;
pub mod rbac;
