use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hyper::Server;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::assistant::{Assistant, ChatMessage, CompletionClient};
use crate::constants::{DEFAULT_EXPORT_FILENAME, DEFAULT_EXPORT_WORKBOOK};
use crate::dataset::{Dataset, DatasetCache};
use crate::error::{DashboardError, DataUnavailable};
use crate::export;
use crate::query::{DirectoryView, FilterOptions, FilterSpec, InsightsView};

/// Shared state for all handlers. Everything in here is read-only apart from
/// the dataset cache's explicit reload.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DatasetCache>,
    pub assistant: Option<Arc<Assistant<dyn CompletionClient>>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(cache: Arc<DatasetCache>) -> Self {
        Self {
            cache,
            assistant: None,
            metrics: None,
        }
    }

    pub fn with_assistant(mut self, assistant: Assistant<dyn CompletionClient>) -> Self {
        self.assistant = Some(Arc::new(assistant));
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    fn dataset(&self) -> Result<Arc<Dataset>, ApiError> {
        self.cache.get().map_err(ApiError::Unavailable)
    }
}

/// Failures surfaced over HTTP
#[derive(Debug)]
pub enum ApiError {
    Unavailable(DataUnavailable),
    AssistantDisabled,
    Assistant(DashboardError),
    Internal(DashboardError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unavailable(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
            ApiError::AssistantDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                DashboardError::MissingApiKey.to_string(),
            ),
            ApiError::Assistant(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            ApiError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let dataset = match state.cache.get() {
        Ok(dataset) => json!({
            "available": true,
            "records": dataset.len(),
            "source": dataset.source(),
            "loaded_at": dataset.loaded_at(),
            "report": dataset.report(),
        }),
        Err(e) => json!({ "available": false, "error": e.to_string() }),
    };

    Json(json!({
        "status": "healthy",
        "service": "alumni-dashboard",
        "version": env!("CARGO_PKG_VERSION"),
        "dataset": dataset,
    }))
}

async fn options(State(state): State<AppState>) -> Result<Json<FilterOptions>, ApiError> {
    let dataset = state.dataset()?;
    Ok(Json(FilterOptions::from_records(dataset.records())))
}

async fn directory(State(state): State<AppState>) -> Result<Json<DirectoryView>, ApiError> {
    let dataset = state.dataset()?;
    Ok(Json(DirectoryView::evaluate(dataset.records(), &FilterOptions::reset())))
}

async fn directory_filtered(
    State(state): State<AppState>,
    Json(spec): Json<FilterSpec>,
) -> Result<Json<DirectoryView>, ApiError> {
    let dataset = state.dataset()?;
    Ok(Json(DirectoryView::evaluate(dataset.records(), &spec)))
}

async fn insights(State(state): State<AppState>) -> Result<Json<InsightsView>, ApiError> {
    let dataset = state.dataset()?;
    Ok(Json(InsightsView::from_records(dataset.records())))
}

async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let dataset = state.dataset()?;
    let body = export::export_to_bytes(dataset.records()).map_err(ApiError::Internal)?;
    let disposition = format!("attachment; filename=\"{}\"", DEFAULT_EXPORT_FILENAME);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn export_xlsx(State(state): State<AppState>) -> Result<Response, ApiError> {
    let dataset = state.dataset()?;
    let body = export::export_to_xlsx_bytes(dataset.records()).map_err(ApiError::Internal)?;
    let disposition = format!("attachment; filename=\"{}\"", DEFAULT_EXPORT_WORKBOOK);

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let assistant = state.assistant.clone().ok_or(ApiError::AssistantDisabled)?;
    let dataset = state.dataset()?;
    let answer = assistant
        .ask(dataset.records(), &request.history, &request.question)
        .await
        .map_err(ApiError::Assistant)?;
    Ok(Json(json!({ "answer": answer })))
}

async fn reload(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let dataset = state.cache.reload().map_err(ApiError::Unavailable)?;
    info!(records = dataset.len(), "Dataset reloaded on request");
    Ok(Json(json!({
        "records": dataset.len(),
        "loaded_at": dataset.loaded_at(),
        "report": dataset.report(),
    })))
}

async fn metrics_text(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Create the HTTP router with all routes
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/options", get(options))
        .route("/api/alumni", get(directory).post(directory_filtered))
        .route("/api/insights", get(insights))
        .route("/api/export.csv", get(export_csv))
        .route("/api/export.xlsx", get(export_xlsx))
        .route("/api/assistant", post(ask))
        .route("/admin/reload", post(reload))
        .route("/metrics", get(metrics_text))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

/// Start the HTTP server on the given address
pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(state);

    info!(%addr, "HTTP server listening");
    println!("🚀 Alumni dashboard API on http://{addr}");
    println!("💚 Health check: http://{addr}/health");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
