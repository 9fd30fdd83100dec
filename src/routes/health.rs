use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Liveness probe
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: checks DB connectivity with timeout protection
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let query = sqlx::query("SELECT 1").fetch_one(&state.db);
    match tokio::time::timeout(std::time::Duration::from_secs(5), query).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout").into_response(),
    }
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.get_snapshot())
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP bookledger_books_created Books added to the catalog\n# TYPE bookledger_books_created counter\nbookledger_books_created {}\n\
# HELP bookledger_borrows_created Borrow transactions created\n# TYPE bookledger_borrows_created counter\nbookledger_borrows_created {}\n\
# HELP bookledger_returns_processed Returns processed\n# TYPE bookledger_returns_processed counter\nbookledger_returns_processed {}\n\
# HELP bookledger_overdue_returns Returns that incurred a fine\n# TYPE bookledger_overdue_returns counter\nbookledger_overdue_returns {}\n\
# HELP bookledger_fines_assessed Fine units assessed\n# TYPE bookledger_fines_assessed counter\nbookledger_fines_assessed {}\n\
# HELP bookledger_logins Successful logins\n# TYPE bookledger_logins counter\nbookledger_logins {}\n\
# HELP bookledger_uptime_seconds Uptime seconds\n# TYPE bookledger_uptime_seconds gauge\nbookledger_uptime_seconds {}\n",
        m.books_created,
        m.borrows_created,
        m.returns_processed,
        m.overdue_returns,
        m.fines_assessed,
        m.logins,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
