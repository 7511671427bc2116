//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireManager`] -- Requires the `MANAGER` role.
//! - [`rbac::RequireInsurer`] -- Requires the `INSURANCE` role.

pub mod auth;
pub mod rbac;
