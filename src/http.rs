use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::header::{HeaderName, ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::NotionSetupError;
use crate::model::{Airdrop, ConnectionStatus};
use crate::notion::model::Database;
use crate::resolver::ScanFailure;
use crate::service::{AirdropService, ServiceError};

/// The Notion backend, or the reason it could not be built.
#[derive(Clone, Debug)]
pub enum Backend {
    Ready(Arc<AirdropService>),
    Unconfigured(NotionSetupError),
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub backend: Backend,
}

impl AppState {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    fn service(&self) -> Result<&AirdropService, HttpError> {
        match &self.backend {
            Backend::Ready(service) => Ok(service),
            Backend::Unconfigured(err) => Err(ServiceError::from(err.clone()).into()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
            CONTENT_TYPE,
            ACCEPT,
            AUTHORIZATION,
        ])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/api/notion/status", get(notion_status))
        .route("/api/notion/databases", get(list_databases))
        .route("/api/notion/setup", post(setup_database))
        .route("/api/notion/sample-data", post(add_sample_data))
        .route("/api/notion/test-cors", get(test_cors))
        .route("/api/airdrops", get(all_airdrops))
        .route("/api/airdrops/featured", get(featured_airdrops))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn notion_status(State(state): State<AppState>) -> Json<ConnectionStatus> {
    let status = match &state.backend {
        Backend::Ready(service) => service.connection_status().await,
        Backend::Unconfigured(err) => ConnectionStatus::failed(err.to_string()),
    };
    Json(status)
}

#[derive(Debug, Serialize)]
struct DatabasesResponse {
    databases: Vec<Database>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<ScanFailure>,
}

async fn list_databases(
    State(state): State<AppState>,
) -> Result<Json<DatabasesResponse>, HttpError> {
    let scan = state.service()?.list_databases().await?;
    Ok(Json(DatabasesResponse {
        databases: scan.databases,
        failures: scan.failures,
    }))
}

async fn setup_database(State(state): State<AppState>) -> Result<Json<Value>, HttpError> {
    let provisioned = state.service()?.ensure_database().await?;
    Ok(Json(json!({
        "success": true,
        "created": provisioned.was_created(),
        "database": provisioned.handle(),
    })))
}

async fn add_sample_data(State(state): State<AppState>) -> Result<Json<Value>, HttpError> {
    let inserted = state.service()?.add_sample_airdrops().await?;
    Ok(Json(json!({
        "success": true,
        "message": "Sample airdrops have been added to your Notion database",
        "inserted": inserted,
    })))
}

async fn test_cors() -> Json<Value> {
    Json(json!({ "success": true }))
}

#[derive(Debug, Serialize)]
struct AirdropsResponse {
    airdrops: Vec<Airdrop>,
}

async fn all_airdrops(State(state): State<AppState>) -> Result<Json<AirdropsResponse>, HttpError> {
    let airdrops = state.service()?.list_airdrops(false).await?;
    Ok(Json(AirdropsResponse { airdrops }))
}

async fn featured_airdrops(
    State(state): State<AppState>,
) -> Result<Json<AirdropsResponse>, HttpError> {
    let airdrops = state.service()?.list_airdrops(true).await?;
    Ok(Json(AirdropsResponse { airdrops }))
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self { status, message }
    }
}

/// Every service failure, a missing database included, is a 500.
impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, "HTTP error: {}", self.message);
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}
