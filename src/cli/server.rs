//! HTTP server mode: the trigger entry point for export cycles
//!
//! A scheduler or event handler calls these routes once per cycle. Each
//! request runs to completion on its own; overlapping requests for the same
//! kind are not coordinated.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::http::ClientProvider;
use crate::schema::SchemaInferrer;
use crate::warehouse::{Ingestor, TableCreator, WarehouseTarget};

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Schema inference; `None` when no statistics source is configured
    pub inferrer: Option<SchemaInferrer>,
    /// Client used for every warehouse call
    pub provider: Arc<dyn ClientProvider>,
    /// Destination project and dataset
    pub target: WarehouseTarget,
    /// Default exclusion pattern
    pub exclude: String,
}

impl ServerConfig {
    /// Build from a validated config
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let inferrer = match config.stats {
            Some(ref stats) => Some(SchemaInferrer::new(stats.open()?)),
            None => None,
        };

        Ok(Self {
            inferrer,
            provider: config.client_provider()?,
            target: config.target(),
            exclude: config.exclude.clone(),
        })
    }

    fn inferrer(&self) -> Result<&SchemaInferrer> {
        self.inferrer
            .as_ref()
            .ok_or(Error::StatsUnavailable)
    }
}

/// Request body for the ingest endpoint
#[derive(Debug, Deserialize)]
struct IngestRequest {
    /// Records in their JSON export form
    records: Vec<Value>,
    /// Exclusion pattern overriding the configured one
    #[serde(default)]
    exclude: Option<String>,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Build the router
pub fn router(config: ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/kinds/:kind/schema", get(get_schema))
        .route("/kinds/:kind/table", post(create_table))
        .route("/ingest", post(ingest))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(config))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Infer the schema of a kind
async fn get_schema(
    State(state): State<Arc<ServerConfig>>,
    Path(kind): Path<String>,
) -> Response {
    let result = match state.inferrer() {
        Ok(inferrer) => inferrer.infer(&kind).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(schema) => (StatusCode::OK, Json(ApiResponse::success(schema))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Create the table of a kind
async fn create_table(
    State(state): State<Arc<ServerConfig>>,
    Path(kind): Path<String>,
) -> Response {
    let inferrer = match state.inferrer() {
        Ok(inferrer) => inferrer.clone(),
        Err(e) => return error_response(&e),
    };

    let creator = TableCreator::new(inferrer, Arc::clone(&state.provider), state.target.clone());
    match creator.create_table_for_kind(&kind).await {
        Ok(table) => (StatusCode::CREATED, Json(ApiResponse::success(table))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Ingest one batch of records
async fn ingest(
    State(state): State<Arc<ServerConfig>>,
    Json(req): Json<IngestRequest>,
) -> Response {
    let exclude = req.exclude.as_deref().unwrap_or(&state.exclude);
    let ingestor =
        Ingestor::new(Arc::clone(&state.provider), state.target.clone()).with_exclude(exclude);

    let count = req.records.len();
    match ingestor.ingest_json(req.records).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(json!({ "ingested": count }))),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Map an error onto a status code and the error envelope
fn error_response(err: &Error) -> Response {
    let status = match err {
        Error::KindStatsNotFound { .. } => StatusCode::NOT_FOUND,
        Error::RecordDecode { .. } => StatusCode::BAD_REQUEST,
        Error::StatsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        Error::InsertErrors { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Http(_) | Error::HttpStatus { .. } | Error::JsonParse(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::error!("Request failed: {}", err);
    (status, Json(ApiResponse::<()>::error(err.to_string()))).into_response()
}
