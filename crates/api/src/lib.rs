pub mod cache;
pub mod config;
pub mod metrics;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use cache::{CacheStats, ResultCache};
use config::AppConfig;
use export::ExportFormat;
use metrics::{Metrics, MetricsSnapshot, NormalizeOutcome, TimedOperation};
use normalize::{Diagnostic, GraphData, Normalized, RawResponse, ResponseNormalizer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

pub struct AppState {
    normalizer: ResponseNormalizer,
    cache: Option<ResultCache>,
    metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| ResultCache::new(config.cache.max_entries));

        Self {
            normalizer: ResponseNormalizer::new(config.normalizer.clone()),
            cache,
            metrics: Metrics::new(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
struct ExportParams {
    format: Option<ExportFormat>,
}

#[derive(Serialize)]
struct MetricsResponse {
    #[serde(flatten)]
    metrics: MetricsSnapshot,
    cache: Option<CacheStats>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/normalize", post(normalize_response))
        .route("/export", post(export_graph))
        .route("/metrics", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn normalize_response(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Normalized>, ApiError> {
    let request_id = uuid::Uuid::new_v4();

    if let Some(cached) = state.cache.as_ref().and_then(|cache| cache.get(&body)) {
        state.metrics.record_request(true);
        state.metrics.record_cache_hit();
        info!(%request_id, "Serving cached normalization");
        return Ok(Json(cached));
    }

    let raw: RawResponse = serde_json::from_slice(&body).map_err(|e| {
        state.metrics.record_request(false);
        warn!(%request_id, error = %e, "Rejected malformed request body");
        api_error(StatusCode::BAD_REQUEST, format!("invalid request body: {}", e))
    })?;

    let timer = TimedOperation::start();
    let normalized = state.normalizer.normalize(&raw).map_err(|e| {
        state.metrics.record_request(false);
        warn!(%request_id, error = %e, "Normalization failed");
        api_error(StatusCode::UNPROCESSABLE_ENTITY, e)
    })?;

    let result = &normalized.result;
    let outcome = NormalizeOutcome {
        nodes: result.graph_data.nodes.len(),
        edges: result.graph_data.edges.len(),
        sources: result.sources.len(),
        partial: normalized.diagnostics.iter().any(|d| {
            matches!(
                d,
                Diagnostic::GraphParseRecovered { .. } | Diagnostic::InvalidGraphShape
            )
        }),
    };
    state.metrics.record_normalize(timer.elapsed(), &outcome);
    state.metrics.record_request(true);

    info!(
        %request_id,
        nodes = outcome.nodes,
        edges = outcome.edges,
        sources = outcome.sources,
        diagnostics = normalized.diagnostics.len(),
        "Normalized model response"
    );

    if let Some(cache) = &state.cache {
        cache.set(&body, normalized.clone());
    }

    Ok(Json(normalized))
}

async fn export_graph(
    Query(params): Query<ExportParams>,
    Json(graph): Json<GraphData>,
) -> Result<Response, ApiError> {
    let format = params.format.unwrap_or_default();
    let body = export::export_graph(&graph, format)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    let disposition = format!("attachment; filename=\"{}\"", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        metrics: state.metrics.snapshot(),
        cache: state.cache.as_ref().map(ResultCache::stats),
    })
}
