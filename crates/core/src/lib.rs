//! Claim workflow domain types.
//!
//! Everything in this crate is free of I/O: the database and HTTP layers
//! depend on it for ids, errors, roles, and the claim status workflow.

pub mod attachment;
pub mod error;
pub mod roles;
pub mod types;
pub mod validation;
pub mod workflow;
