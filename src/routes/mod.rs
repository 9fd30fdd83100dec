//! HTTP route handlers for the BookLedger API.
//!
//! - `auth`: signup, login, logout, token refresh and password change
//! - `books`: the book catalog (reads open, writes admin-only)
//! - `health`: liveness, readiness, metrics and version endpoints
//! - `transactions`: borrow, return and borrow history for the caller

pub mod auth;
pub mod books;
pub mod health;
pub mod transactions;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Builds the full route table over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
        .route("/auth/signup/", post(auth::signup))
        .route("/auth/login/", post(auth::login))
        .route("/auth/logout/", post(auth::logout))
        .route("/auth/change-password/", post(auth::change_password))
        .route("/auth/token/refresh/", post(auth::refresh))
        .route("/books/", get(books::list_books).post(books::create_book))
        .route(
            "/books/{id}/",
            get(books::get_book)
                .put(books::update_book)
                .patch(books::patch_book)
                .delete(books::delete_book),
        )
        .route("/transactions/borrow/", post(transactions::borrow_book))
        .route("/transactions/return/{id}/", post(transactions::return_book))
        .route("/transactions/history/", get(transactions::borrow_history))
        .with_state(state)
        // Request bodies here are small JSON documents
        .layer(DefaultBodyLimit::max(64 * 1024))
}
