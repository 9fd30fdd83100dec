//! Integration and unit tests for BookLedger.
//!
//! ## Test Modules
//!
//! - **api_tests**: HTTP-level tests driving the full router
//! - **lending_tests**: Borrow/return/fine lifecycle against the database
//! - **catalog_tests**: Book catalog storage and copy-count invariants
//! - **identity_tests**: Accounts, sessions and admin bootstrap
//! - **error_tests**: Error mapping and response bodies
//! - **config_tests**: Configuration loading and validation
//! - **db_tests**: Schema initialization and constraints
//!
//! Every test gets its own temporary SQLite file via [`TestContext::new`].

pub mod catalog_tests;
pub mod config_tests;

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{
    catalog,
    config::AppConfig,
    db,
    models::{Book, BookFields, Role, User},
    routes,
    state::AppState,
};

pub const TEST_PASSWORD: &str = "correct-horse";

pub fn test_config(db_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = db_url.to_string();
    // Minimum bcrypt cost keeps the suite fast
    config.auth.bcrypt_cost = 4;
    config
}

pub struct TestContext {
    pub state: AppState,
    // Keeps the database file alive for the lifetime of the test
    _db_file: NamedTempFile,
}

impl TestContext {
    pub async fn new() -> Self {
        let db_file = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite://{}", db_file.path().display());
        let pool = db::connect(&db_url, 4).await.unwrap();
        db::init_db(&pool).await.unwrap();

        let state = AppState::new(pool, test_config(&db_url));
        Self { state, _db_file: db_file }
    }

    pub fn app(&self) -> Router {
        routes::router(self.state.clone())
    }

    pub fn db(&self) -> &sqlx::SqlitePool {
        &self.state.db
    }

    /// Registers `username` with `role` and logs in. Returns the user and a bearer token.
    pub async fn user_with_role(&self, username: &str, role: Role) -> (User, String) {
        let mut user = self.state.identity.register(username, TEST_PASSWORD, "").await.unwrap();
        if role != Role::User {
            sqlx::query("UPDATE users SET role = ?1 WHERE id = ?2")
                .bind(role)
                .bind(user.id)
                .execute(self.db())
                .await
                .unwrap();
            user.role = role;
        }
        let session = self.state.identity.authenticate(username, TEST_PASSWORD).await.unwrap();
        (user, session.token)
    }

    pub async fn user(&self, username: &str) -> (User, String) {
        self.user_with_role(username, Role::User).await
    }

    pub async fn admin(&self) -> (User, String) {
        self.user_with_role("librarian", Role::Admin).await
    }

    pub async fn book(&self, title: &str, total_copies: i64) -> Book {
        catalog::create_book(
            self.db(),
            BookFields {
                title: title.to_string(),
                author: "Author".to_string(),
                description: String::new(),
                total_copies,
                borrowed_copies: 0,
            },
        )
        .await
        .unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        use tower::ServiceExt;
        self.app().oneshot(req).await.unwrap()
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
