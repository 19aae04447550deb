//! API client module for the taskdeck CLI.
//!
//! Provides the HTTP client with bearer token injection, keychain session
//! storage, endpoint wrappers for the backend's user/task/category routes,
//! and the request/response types they exchange.

pub mod auth;
pub mod categories;
pub mod client;
pub mod error;
pub mod health;
pub mod tasks;
pub mod types;
pub mod users;
