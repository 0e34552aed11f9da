use anyhow::Result;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use catalog_core::persist::{index_size, load_index, load_stats, IndexPaths};
use catalog_core::{describe, Error, Filters, JournalMeta, SearchEngine, SearchOptions, SearchResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Upper bound on results per request.
pub const MAX_TOP_K: usize = 1000;

pub const SUGGESTIONS: [&str; 15] = [
    "computer science artificial intelligence",
    "medical health journal",
    "environmental science climate change",
    "physics quantum mechanics",
    "economics finance business",
    "biology molecular genetics",
    "chemistry organic synthesis",
    "engineering mechanical design",
    "psychology cognitive science",
    "mathematics statistical analysis",
    "neuroscience brain research",
    "materials science nanotechnology",
    "social sciences anthropology",
    "education learning teaching",
    "renewable energy sustainability",
];

fn default_top_k() -> usize { 20 }
fn default_k() -> usize { 10 }
fn default_min_score() -> f32 { 0.1 }

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FilterParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_access: Option<String>,
    /// Comma-separated ASJC codes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_areas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Blank values leave a clause unset.
fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

impl FilterParams {
    pub fn to_filters(&self) -> Filters {
        Filters {
            publisher: non_blank(&self.publisher),
            source_type: non_blank(&self.source_type),
            open_access: non_blank(&self.open_access),
            subject_codes: non_blank(&self.subject_areas)
                .map(|s| Filters::parse_subject_codes(&s))
                .unwrap_or_default(),
            language: non_blank(&self.language),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    #[serde(default)]
    pub filters: FilterParams,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub filters_applied: FilterParams,
    pub total_results: usize,
    pub took_s: f64,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub rank: usize,
    pub score: f32,
    pub title: String,
    pub publisher: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub issn: String,
    pub eissn: String,
    pub open_access: String,
    pub active_status: String,
    pub coverage: String,
    pub language: String,
    pub subject_codes: Vec<String>,
    pub sourcerecord_id: String,
    pub description: String,
}

impl From<SearchResult> for SearchHit {
    fn from(r: SearchResult) -> Self {
        let description = describe(&r.meta);
        let JournalMeta {
            title,
            publisher,
            source_type,
            issn,
            eissn,
            open_access,
            active_status,
            coverage,
            subject_codes,
            language,
            external_id,
        } = r.meta;
        SearchHit {
            rank: r.rank,
            score: r.score,
            title,
            publisher,
            source_type,
            issn,
            eissn,
            open_access,
            active_status,
            coverage,
            language,
            subject_codes: subject_codes.into_iter().collect(),
            sourcerecord_id: external_id,
            description,
        }
    }
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub total_journals: usize,
    pub total_features: usize,
    pub source_file: String,
    pub index_size_mb: f64,
}

/// Error body shared by every endpoint: `{"error": ..., "results": []}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            Error::IndexUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.to_string())
    }
}

// Malformed request bodies and parameters are bad requests like any other
// invalid option, with the same JSON error body.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error = %self.message, "request failed");
        }
        let body = serde_json::json!({ "error": self.message, "results": [] });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub index_dir: PathBuf,
    /// Swapped whole on reload; queries clone the inner `Arc` and drop the lock.
    pub engine: Arc<RwLock<Option<Arc<SearchEngine>>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    /// Load the index under `index_dir`. A missing or unreadable index leaves
    /// the server running without one; searches then answer 503.
    pub fn load(index_dir: impl Into<PathBuf>, admin_token: Option<String>) -> Self {
        let index_dir = index_dir.into();
        let engine = match load_index(&IndexPaths::new(&index_dir)) {
            Ok(engine) => Some(Arc::new(engine)),
            Err(err) => {
                tracing::warn!(index_dir = %index_dir.display(), %err, "starting without an index");
                None
            }
        };
        Self { index_dir, engine: Arc::new(RwLock::new(engine)), admin_token }
    }

    fn paths(&self) -> IndexPaths { IndexPaths::new(&self.index_dir) }

    fn current(&self) -> ApiResult<Arc<SearchEngine>> {
        self.engine.read().clone().ok_or_else(|| {
            ApiError::from(Error::IndexUnavailable {
                reason: format!("no index loaded from {}; run the indexer first", self.index_dir.display()),
            })
        })
    }
}

pub fn build_app(index_dir: impl Into<PathBuf>) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
    let state = AppState::load(index_dir, admin_token);
    Ok(router(state).layer(cors_from_env()))
}

/// CORS_ALLOW_ORIGIN (comma-separated) or any origin by default.
fn cors_from_env() -> CorsLayer {
    let any = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                any
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => any,
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_get_handler).post(search_post_handler))
        .route("/stats", get(stats_handler))
        .route("/suggestions", get(suggestions_handler))
        .route("/doc/:position", get(doc_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn run_search(state: &AppState, query: String, opts: SearchOptions, filters_applied: FilterParams) -> ApiResult<SearchResponse> {
    let start = Instant::now();
    let query = query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Please enter a search query"));
    }
    let engine = state.current()?;
    let opts = SearchOptions { top_k: opts.top_k.min(MAX_TOP_K), ..opts };
    let results: Vec<SearchHit> = engine.search(&query, &opts)?.into_iter().map(SearchHit::from).collect();
    let took_s = start.elapsed().as_secs_f64();
    tracing::info!(query = %query, hits = results.len(), took_s, "search");
    Ok(SearchResponse { query, filters_applied, total_results: results.len(), took_s, results })
}

pub async fn search_post_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(req) = payload?;
    let opts = SearchOptions::new(req.top_k).min_score(req.min_score).filters(req.filters.to_filters());
    run_search(&state, req.query, opts, req.filters).map(Json)
}

pub async fn search_get_handler(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Query(params) = params?;
    let opts = SearchOptions::new(params.k).min_score(params.min_score);
    run_search(&state, params.q, opts, FilterParams::default()).map(Json)
}

pub async fn stats_handler(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let engine = state.current()?;
    let paths = state.paths();
    let stats = engine.stats();
    let source_file = load_stats(&paths).map(|s| s.source).unwrap_or_default();
    let bytes = index_size(&paths).unwrap_or(0);
    let index_size_mb = (bytes as f64 / (1024.0 * 1024.0) * 10.0).round() / 10.0;
    Ok(Json(StatsResponse {
        total_journals: stats.total_documents,
        total_features: stats.total_features,
        source_file,
        index_size_mb,
    }))
}

pub async fn suggestions_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "suggestions": SUGGESTIONS }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    position: std::result::Result<Path<usize>, PathRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Path(position) = position?;
    let engine = state.current()?;
    let doc = engine
        .document(position)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("no journal at position {position}")))?;
    Ok(Json(serde_json::json!({
        "position": doc.position,
        "text": doc.text,
        "metadata": doc.meta,
        "description": describe(&doc.meta),
    })))
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<serde_json::Value>> {
    authorize(&state, &headers)?;
    let paths = state.paths();
    let engine = tokio::task::spawn_blocking(move || load_index(&paths))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    let total = engine.stats().total_documents;
    *state.engine.write() = Some(Arc::new(engine));
    tracing::info!(total_journals = total, "index reloaded");
    Ok(Json(serde_json::json!({ "status": "reloaded", "total_journals": total })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError::new(StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set")),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::new(StatusCode::UNAUTHORIZED, "invalid admin token"))
    }
}
