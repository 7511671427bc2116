//! Well-known role names.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20260301000002_create_users_table.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_USER: &str = "USER";
pub const ROLE_MANAGER: &str = "MANAGER";
pub const ROLE_INSURANCE: &str = "INSURANCE";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_MANAGER, ROLE_INSURANCE];

/// A user's role, as carried in the `users.role` column and the JWT `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Manager,
    Insurance,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Manager => ROLE_MANAGER,
            Role::Insurance => ROLE_INSURANCE,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(Role::User),
            ROLE_MANAGER => Ok(Role::Manager),
            ROLE_INSURANCE => Ok(Role::Insurance),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }
}
