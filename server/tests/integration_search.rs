use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use solver_core::SolverConfig;
use solver_server::{build_app, AppState};
use std::fs;
use tempfile::tempdir;
use tower::ServiceExt;

const ANIMALS: [&str; 4] = [
    "a cat is a feline and likes to purr",
    "a dog is the human's best friend and loves to play",
    "a bird is a beautiful animal that can fly",
    "a fish is a creature that lives in water and swims",
];

fn app_with_corpus() -> Router {
    let state = AppState::new(SolverConfig { n_answer: 2, ..Default::default() }, Some("secret".into()));
    state.solver.load_corpus(ANIMALS);
    build_app(state)
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(t) = token {
        builder = builder.header("X-ADMIN-TOKEN", t);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let (status, json) = call(app_with_corpus(), get("/search?q=does%20the%20fish%20purr%20like%20a%20cat&k=2")).await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 0);
    assert_eq!(arr[1]["doc_id"].as_u64().unwrap(), 3);
    assert_eq!(json["total_hits"].as_u64().unwrap(), 2);
}

#[tokio::test]
async fn answer_joins_top_documents() {
    let (status, json) = call(app_with_corpus(), get("/answer?q=does%20the%20fish%20purr%20like%20a%20cat")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["answer"].as_str().unwrap(),
        "a cat is a feline and likes to purr. a fish is a creature that lives in water and swims"
    );
}

#[tokio::test]
async fn search_without_corpus_is_unavailable() {
    let app = build_app(AppState::new(SolverConfig::default(), None));
    let (status, _) = call(app.clone(), get("/search?q=cat")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, json) = call(app, get("/answer?q=cat")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["answer"].is_null());
}

#[tokio::test]
async fn rerank_and_evidence() {
    let app = app_with_corpus();
    let body = json!({"query": "what is the speed of light", "options": ["very fast", "10m/s", "the speed of light is C"]});
    let (status, json) = call(app.clone(), post_json("/rerank", body, None)).await;
    assert_eq!(status, StatusCode::OK);
    let ranked = json["ranked"].as_array().unwrap();
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0]["option"], "the speed of light is C");
    assert!(ranked[0]["score"].as_f64().unwrap() > 0.0);

    let body = json!({"question": "who painted the mona lisa?", "evidence": "The Louvre is in Paris. The Mona Lisa was painted by Leonardo."});
    let (status, json) = call(app, post_json("/evidence", body, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["passage"], "The Mona Lisa was painted by Leonardo.");
}

#[tokio::test]
async fn corpus_reload_requires_token() {
    let app = app_with_corpus();
    let body = json!({"documents": ["rust is a language", "tea is a drink"]});
    let (status, _) = call(app.clone(), post_json("/corpus", body.clone(), Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = call(app.clone(), post_json("/corpus", body, Some("secret"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["num_docs"], 2);

    // n_answer is 2, so the zero-score runner-up is joined after the match
    let (_, json) = call(app, get("/answer?q=drink")).await;
    assert_eq!(json["answer"], "tea is a drink. rust is a language");
}

#[tokio::test]
async fn serves_corpus_loaded_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corpus.txt");
    fs::write(&path, ANIMALS.join("\n")).unwrap();
    let state = AppState::new(SolverConfig::default(), None);
    state.solver.load_corpus(solver_core::corpus::load_documents(&path).unwrap());
    let (_, json) = call(build_app(state), get("/answer?q=which%20animal%20can%20fly")).await;
    assert_eq!(json["answer"], ANIMALS[2]);
}
