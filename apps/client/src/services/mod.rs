//! Thin wrappers over endpoints that have no cache of their own.

pub mod auth;
pub mod employers;
pub mod users;
