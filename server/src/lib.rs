use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use solver_core::{CorpusSolver, EvidenceExtractor, Hit, OptionReranker, SolverConfig, SolverError};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod args;
pub use args::{ConfigArgs, ServeArgs};

type ApiError = (StatusCode, String);

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    pub lang: Option<String>,
    /// Apply min_conf to the ranking
    #[serde(default)]
    pub filter: bool,
}
fn default_k() -> usize { 3 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Hit>,
}

#[derive(Deserialize)]
pub struct AnswerParams {
    pub q: String,
    pub lang: Option<String>,
}

#[derive(Serialize)]
pub struct AnswerResponse {
    pub query: String,
    pub answer: Option<String>,
}

#[derive(Deserialize)]
pub struct RerankRequest {
    pub query: String,
    pub options: Vec<String>,
    pub lang: Option<String>,
}

#[derive(Serialize)]
pub struct RankedOption {
    pub score: f32,
    pub option: String,
}

#[derive(Serialize)]
pub struct RerankResponse {
    pub query: String,
    pub ranked: Vec<RankedOption>,
}

#[derive(Deserialize)]
pub struct EvidenceRequest {
    pub question: String,
    pub evidence: String,
    pub lang: Option<String>,
}

#[derive(Serialize)]
pub struct EvidenceResponse {
    pub question: String,
    pub passage: Option<String>,
}

#[derive(Deserialize)]
pub struct CorpusRequest {
    pub documents: Vec<String>,
}

#[derive(Serialize)]
pub struct CorpusResponse {
    pub num_docs: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub solver: Arc<CorpusSolver>,
    pub reranker: Arc<OptionReranker>,
    pub evidence: Arc<EvidenceExtractor>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(config: SolverConfig, admin_token: Option<String>) -> Self {
        Self {
            solver: Arc::new(CorpusSolver::new(config.clone())),
            reranker: Arc::new(OptionReranker::new(config.clone())),
            evidence: Arc::new(EvidenceExtractor::new(config)),
            admin_token,
        }
    }
}

pub fn build_app(app_state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
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
        .route("/search", get(search_handler))
        .route("/answer", get(answer_handler))
        .route("/rerank", post(rerank_handler))
        .route("/evidence", post(evidence_handler))
        .route("/corpus", post(corpus_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn solver_error(e: SolverError) -> ApiError {
    match e {
        SolverError::CorpusNotLoaded => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, 100);
    let lang = params.lang.as_deref();
    let results = if params.filter {
        state.solver.retrieve_from_corpus(&params.q, lang, k)
    } else {
        state.solver.query(&params.q, lang, k)
    }
    .map_err(solver_error)?;
    let total_hits = results.iter().filter(|h| h.score > 0.0).count();
    Ok(Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), total_hits, results }))
}

pub async fn answer_handler(State(state): State<AppState>, Query(params): Query<AnswerParams>) -> Json<AnswerResponse> {
    let answer = state.solver.get_answer(&params.q, params.lang.as_deref());
    Json(AnswerResponse { query: params.q, answer })
}

pub async fn rerank_handler(State(state): State<AppState>, Json(req): Json<RerankRequest>) -> Json<RerankResponse> {
    let ranked = state
        .reranker
        .rerank(&req.query, &req.options, req.lang.as_deref())
        .into_iter()
        .map(|(score, option)| RankedOption { score, option })
        .collect();
    Json(RerankResponse { query: req.query, ranked })
}

pub async fn evidence_handler(State(state): State<AppState>, Json(req): Json<EvidenceRequest>) -> Json<EvidenceResponse> {
    let passage = state.evidence.best_passage(&req.evidence, &req.question, req.lang.as_deref());
    Json(EvidenceResponse { question: req.question, passage })
}

/// Replace the served corpus. Queries keep using the old one until the new
/// index is fully built.
async fn corpus_handler(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<CorpusRequest>) -> Result<Json<CorpusResponse>, ApiError> {
    authorize(&state, &headers)?;
    let num_docs = req.documents.len();
    let solver = state.solver.clone();
    tokio::task::spawn_blocking(move || solver.load_corpus(req.documents))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    tracing::info!(num_docs, "corpus replaced");
    Ok(Json(CorpusResponse { num_docs }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
