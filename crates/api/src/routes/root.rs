//! Root and health check endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Root response.
#[derive(Serialize)]
pub struct RootResponse {
    /// Greeting.
    pub message: String,
    /// Service version.
    pub version: &'static str,
    /// Health check path.
    pub health: &'static str,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`.
    pub status: &'static str,
    /// Application name.
    pub service: String,
    /// Service version.
    pub version: &'static str,
    /// Deployment environment.
    pub environment: String,
    /// `connected` or `disconnected`.
    pub database: &'static str,
}

async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} API", state.app.name),
        version: env!("CARGO_PKG_VERSION"),
        health: "/health",
    })
}

/// Health check handler. Pings the database.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, code, database) = match state.db.ping().await {
        Ok(()) => ("healthy", StatusCode::OK, "connected"),
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            ("unhealthy", StatusCode::SERVICE_UNAVAILABLE, "disconnected")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            service: state.app.name.clone(),
            version: env!("CARGO_PKG_VERSION"),
            environment: state.app.environment.clone(),
            database,
        }),
    )
}

/// Creates root and health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

    use super::*;
    use crate::test_support::{get, json_body, send, state};

    #[tokio::test]
    async fn test_root() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(state(db), get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["health"], "/health");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_health_connected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let response = send(state(db), get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
        assert_eq!(body["environment"], "development");
    }

    #[tokio::test]
    async fn test_health_disconnected() {
        let response = send(state(DatabaseConnection::Disconnected), get("/health")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["database"], "disconnected");
    }
}
