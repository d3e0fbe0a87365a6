use api::config::AppConfig;
use api::{AppState, build_router};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    build_router(Arc::new(AppState::new(&AppConfig::default())))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn grounded_request() -> Value {
    json!({
        "text": "Rust is a systems language.\n```json\n{\"nodes\":[{\"id\":\"rust\",\"label\":\"Rust\",\"type\":\"product\",\"description\":\"Language\"},{\"id\":\"mozilla\",\"label\":\"Mozilla\",\"type\":\"organization\",\"description\":\"Sponsor\"}],\"edges\":[{\"source\":\"mozilla\",\"target\":\"rust\",\"relation\":\"sponsored\"},{\"source\":\"rust\",\"target\":\"llvm\",\"relation\":\"uses\"}]}\n```",
        "groundingChunks": [{"web": {"uri": "https://www.rust-lang.org/", "title": "Rust"}}],
        "groundingSupports": [{"segment": {"startIndex": 0, "endIndex": 27, "text": "Rust is a systems language."}, "groundingChunkIndices": [0]}],
        "searchQueries": ["rust language"]
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn normalize_returns_result_record() {
    let response = app()
        .oneshot(post_json("/normalize", &grounded_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let result = &body["result"];
    assert_eq!(result["summary"], "Rust is a systems language.");
    assert_eq!(result["graphData"]["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(result["graphData"]["edges"].as_array().unwrap().len(), 1);
    assert_eq!(result["sources"][0]["uri"], "https://www.rust-lang.org");
    assert_eq!(result["sources"][0]["citationCount"], 1);
    assert_eq!(result["searchQueries"], json!(["rust language"]));
    assert_eq!(body["diagnostics"][0]["kind"], "danglingEdge");
}

#[tokio::test]
async fn unparseable_graph_without_sources_is_unprocessable() {
    let response = app()
        .oneshot(post_json("/normalize", &json!({"text": "{\"nodes\": ["})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("failed to parse graph data"));
}

#[tokio::test]
async fn malformed_request_body_is_rejected() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/normalize")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_request_is_served_from_cache() {
    let app = app();
    let request = grounded_request();

    let first = app.clone().oneshot(post_json("/normalize", &request)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.clone().oneshot(post_json("/normalize", &request)).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let metrics = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let metrics = body_json(metrics).await;
    assert_eq!(metrics["total_requests"], 2);
    assert_eq!(metrics["cache_hits"], 1);
    assert_eq!(metrics["total_nodes"], 2);
    assert_eq!(metrics["cache"]["results_cached"], 1);
}

#[tokio::test]
async fn export_yaml_sets_download_headers() {
    let graph = json!({
        "nodes": [{"id": "1", "label": "A", "type": "concept", "description": ""}],
        "edges": []
    });

    let response = app()
        .oneshot(post_json("/export?format=yaml", &graph))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/yaml");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"knowledge-graph.yaml\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("nodes:"));
}

#[tokio::test]
async fn export_defaults_to_json() {
    let graph = json!({"nodes": [], "edges": []});
    let response = app().oneshot(post_json("/export", &graph)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_json(response).await, graph);
}
