//! Shared response envelope types for API handlers.
//!
//! Claim and user endpoints answer with named envelopes (`{ "claims": ... }`,
//! `{ "claim": ... }`, `{ "users": ... }`) that the web client reads directly.
//! Everything else uses the `{ "data": ... }` envelope.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "claims": [...] }`
#[derive(Debug, Serialize)]
pub struct ClaimsResponse<T: Serialize> {
    pub claims: Vec<T>,
}

/// `{ "claim": ... }`
#[derive(Debug, Serialize)]
pub struct ClaimResponse<T: Serialize> {
    pub claim: T,
}

/// `{ "users": [...] }`
#[derive(Debug, Serialize)]
pub struct UsersResponse<T: Serialize> {
    pub users: Vec<T>,
}
