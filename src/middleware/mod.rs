//! Request-side plumbing shared by the route handlers.
//!
//! `auth` holds the extractors that turn a bearer token into an authenticated
//! caller and enforce role capabilities before a handler runs.

pub mod auth;

pub use auth::{CatalogAdmin, CurrentUser};
