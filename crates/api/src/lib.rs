//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Root and health endpoints
//! - Request extractors and error responses

pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use finadmin_core::archive::InvoiceArchive;
use finadmin_core::extraction::InvoiceProcessor;
use finadmin_shared::{AppSettings, CorsConfig, UploadConfig};
use sea_orm::DatabaseConnection;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Invoice extraction pipeline.
    pub processor: InvoiceProcessor,
    /// Archive for uploaded invoices (optional).
    pub archive: Option<InvoiceArchive>,
    /// Name and environment reported by the health endpoints.
    pub app: Arc<AppSettings>,
    /// Upload limits.
    pub upload: UploadConfig,
}

/// Creates the main application router.
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .merge(routes::root::routes())
        .nest("/api/v1", routes::api_routes(&state.upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for route tests.

    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, Response};
    use finadmin_core::extraction::{ExtractionError, GenerativeModel, InvoiceProcessor};
    use finadmin_shared::{AppSettings, CorsConfig, UploadConfig};
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;

    use crate::{AppState, create_router};

    /// Model that answers every prompt with the same JSON.
    pub struct FakeModel {
        pub response: Result<String, ExtractionError>,
        pub configured: bool,
        pub prompts: Mutex<Vec<String>>,
    }

    impl FakeModel {
        pub fn answering(json: &str) -> Self {
            Self {
                response: Ok(json.to_string()),
                configured: true,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn unconfigured() -> Self {
            Self {
                response: Err(ExtractionError::NotConfigured),
                configured: false,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerativeModel for FakeModel {
        fn name(&self) -> &str {
            "fake"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn generate_json(&self, prompt: &str) -> Result<String, ExtractionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.response {
                Ok(json) => Ok(json.clone()),
                Err(_) => Err(ExtractionError::NotConfigured),
            }
        }
    }

    pub fn state(db: DatabaseConnection) -> AppState {
        state_with_model(db, FakeModel::unconfigured())
    }

    pub fn state_with_model(db: DatabaseConnection, model: FakeModel) -> AppState {
        AppState {
            db: Arc::new(db),
            processor: InvoiceProcessor::new(Arc::new(model)),
            archive: None,
            app: Arc::new(AppSettings::default()),
            upload: UploadConfig::default(),
        }
    }

    pub async fn send(state: AppState, request: Request<Body>) -> Response<Body> {
        create_router(state, &CorsConfig::default())
            .oneshot(request)
            .await
            .unwrap()
    }

    pub async fn json_body(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// Mock row answering a `count()` query.
    pub fn count_row(n: i64) -> BTreeMap<String, sea_orm::Value> {
        BTreeMap::from([("num_items".to_string(), sea_orm::Value::from(n))])
    }
}
