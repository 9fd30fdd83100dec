use std::sync::Arc;

use crate::config::AppConfig;
use crate::identity::{IdentityProvider, SqliteIdentityProvider};
use crate::metrics::Metrics;

/// The shared application state.
///
/// Cloned into every handler by axum. Apart from the atomic metrics counters,
/// all mutable state lives in the database.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool holding books, borrows, users and sessions.
    pub db: sqlx::SqlitePool,
    /// Resolves bearer tokens and manages accounts.
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<AppConfig>,
    pub metrics: Metrics,
}

impl AppState {
    /// Creates the state with the SQLite-backed identity provider.
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let identity: Arc<dyn IdentityProvider> = Arc::new(SqliteIdentityProvider::new(db.clone(), &config.auth));
        Self { db, identity, config: Arc::new(config), metrics: Metrics::new() }
    }
}
