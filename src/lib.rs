//! # BookLedger Backend Library
//!
//! A library lending service: a book catalog with copy counts, a ledger of
//! borrow transactions, and overdue fines assessed at return time, served as a
//! JSON API.
//!
//! ## Architecture
//!
//! The application is built using:
//! - **Axum**: HTTP server, routing and request extractors
//! - **SQLx**: Asynchronous database operations with SQLite
//! - **Tokio**: Async runtime
//! - **Serde**: Serialization/deserialization for JSON APIs
//!
//! ## Core Components
//!
//! - [`catalog`]: Book records and the copy-count invariant
//! - [`ledger`]: Borrow records and their single return transition
//! - [`lending`]: Borrow, return and history operations over catalog and ledger
//! - [`identity`]: Accounts, bearer sessions and the admin bootstrap
//! - [`models`]: Domain types, roles/capabilities and the fine rule
//! - [`middleware`]: Authentication and authorization extractors
//! - [`routes`]: HTTP API endpoint handlers
//! - [`config`]: Layered application configuration
//! - [`db`]: Connection setup and schema initialization
//! - [`error`]: Centralized error handling and HTTP error responses
//! - [`metrics`]: Lending counters
//! - [`state`]: Shared application state
//! - [`types`]: Request/response DTOs

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod lending;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
