use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use recsearch_core::{parse_records, ErrorKind, IndexConfig, IndexStats, IngestReport, SearchHit, SearchParams, SharedIndex};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub min_score: f64,
}
fn default_k() -> usize { recsearch_core::config::DEFAULT_LIMIT }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub index: IndexConfig,
    /// When set, `/ingest` requires a matching `X-ADMIN-TOKEN` header.
    pub admin_token: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: SharedIndex,
    pub admin_token: Option<String>,
}

/// JSON `{"error": ...}` body with a status code.
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

impl From<recsearch_core::Error> for ApiError {
    fn from(e: recsearch_core::Error) -> Self {
        let status = match e.kind() {
            ErrorKind::Input | ErrorKind::InvalidQuery => StatusCode::BAD_REQUEST,
            ErrorKind::NotIndexed => StatusCode::CONFLICT,
            ErrorKind::Indexing => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Search => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self { ApiError(r.status(), r.body_text()) }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self { ApiError(r.status(), r.body_text()) }
}

pub fn build_app(config: ServerConfig) -> Router {
    let state = AppState { index: SharedIndex::new(config.index), admin_token: config.admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ingest", post(ingest_handler))
        .route("/search", get(search_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn ingest_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestReport>), ApiError> {
    authorize(&state, &headers)?;
    let Json(body) = body?;
    let records = parse_records(body)?;
    let index = state.index.clone();
    // fitting is CPU-bound
    let report = tokio::task::spawn_blocking(move || index.ingest(records))
        .await
        .map_err(|e| ApiError(StatusCode::INTERNAL_SERVER_ERROR, format!("ingest task failed: {e}")))?;
    let status = if report.is_success() { StatusCode::OK } else { StatusCode::UNPROCESSABLE_ENTITY };
    Ok((status, Json(report)))
}

pub async fn search_handler(
    State(state): State<AppState>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let Query(params) = params?;
    if !(1..=MAX_K).contains(&params.k) {
        return Err(ApiError(StatusCode::BAD_REQUEST, format!("k must be between 1 and {MAX_K}, got {}", params.k)));
    }
    let search = SearchParams::new(params.k, params.min_score);
    let results = state.index.search(&params.q, &search)?;
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: results.len(), results }))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.index.stats())
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(required) = &state.admin_token else { return Ok(()) };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError(StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
