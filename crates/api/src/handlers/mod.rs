pub mod auth;
pub mod claims;
pub mod fppa04;
pub mod users;
