mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;

use cinematch::api::{create_router, AppState};
use cinematch::services::{PosterResolver, Provisioner, RetryPolicy};
use cinematch::storage::ArtifactStore;

use common::{movies_pickle, similarity_pickle, temp_dir, RecordingDelay, StubMetadata, StubSource};

fn create_test_server(source: StubSource, metadata: StubMetadata) -> TestServer {
    let store = ArtifactStore::new(temp_dir("api"), Arc::new(source));
    let provisioner = Arc::new(Provisioner::new(
        store,
        "movies-id".to_string(),
        "similarity-id".to_string(),
    ));
    let posters = PosterResolver::new(
        Arc::new(metadata),
        Arc::new(RecordingDelay::default()),
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
        },
        common::PLACEHOLDER.to_string(),
    );

    let state = AppState::new(provisioner, posters, 5, 1024 * 1024);
    TestServer::new(create_router(state)).unwrap()
}

async fn loaded_server(metadata: StubMetadata) -> TestServer {
    let server = create_test_server(StubSource::serving_fixtures(), metadata);
    server.post("/api/v1/artifacts/reload").await.assert_status_ok();
    server
}

fn titles(body: &serde_json::Value) -> Vec<String> {
    body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(StubSource::offline(), StubMetadata::default());
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_movies_unavailable_before_data_is_loaded() {
    let server = create_test_server(StubSource::offline(), StubMetadata::default());

    let response = server.get("/api/v1/movies").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("upload"));

    let status: serde_json::Value = server.get("/api/v1/status").await.json();
    assert_eq!(status["ready"], false);
    assert_eq!(status["movies"], 0);
}

#[tokio::test]
async fn test_reload_provisions_and_lists_movies() {
    let server = loaded_server(StubMetadata::default()).await;

    let movies: Vec<String> = server.get("/api/v1/movies").await.json();
    assert_eq!(movies, vec!["A", "B", "C", "D", "E", "F", "G"]);

    let status: serde_json::Value = server.get("/api/v1/status").await.json();
    assert_eq!(status["ready"], true);
    assert_eq!(status["movies"], 7);
    assert_eq!(status["origin"], "remote");
}

#[tokio::test]
async fn test_recommendations_are_ranked_with_posters() {
    let server = loaded_server(StubMetadata::default()).await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "title": "A" }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["query"], "A");
    assert_eq!(titles(&body), vec!["E", "B", "D", "G", "F"]);
    assert_eq!(body["recommendations"][0]["poster_url"], "https://img.example/E.jpg");
    assert_eq!(body["recommendations"][0]["index"], 4);
}

#[tokio::test]
async fn test_unknown_poster_falls_back_to_placeholder() {
    let metadata = StubMetadata {
        unknown: vec!["B".to_string()],
    };
    let server = loaded_server(metadata).await;

    let body: serde_json::Value = server
        .post("/api/v1/recommendations")
        .json(&json!({ "title": "A" }))
        .await
        .json();

    assert_eq!(body["recommendations"][1]["title"], "B");
    assert_eq!(body["recommendations"][1]["poster_url"], common::PLACEHOLDER);
    assert_eq!(body["recommendations"][2]["poster_url"], "https://img.example/D.jpg");
}

#[tokio::test]
async fn test_unknown_title_is_not_found() {
    let server = loaded_server(StubMetadata::default()).await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "title": "Zardoz" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Movie 'Zardoz' is not in the catalog");
}

#[tokio::test]
async fn test_malformed_recommendation_body_is_json_error() {
    let server = loaded_server(StubMetadata::default()).await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "name": "A" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("title"));

    let response = server.post("/api/v1/recommendations").text("A").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_reload_failure_reports_provisioning_error() {
    let server = create_test_server(StubSource::offline(), StubMetadata::default());

    let response = server.post("/api/v1/artifacts/reload").await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let status: serde_json::Value = server.get("/api/v1/status").await.json();
    assert_eq!(status["ready"], false);
}

#[tokio::test]
async fn test_manual_upload_flow() {
    let server = create_test_server(StubSource::offline(), StubMetadata::default());

    let response = server
        .put("/api/v1/artifacts/movies")
        .bytes(Bytes::from(movies_pickle()))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "staged");
    assert_eq!(body["awaiting"], "similarity");

    let response = server
        .put("/api/v1/artifacts/similarity")
        .bytes(Bytes::from(similarity_pickle()))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "loaded");
    assert_eq!(body["movies"], 7);

    let status: serde_json::Value = server.get("/api/v1/status").await.json();
    assert_eq!(status["origin"], "upload");

    let body: serde_json::Value = server
        .post("/api/v1/recommendations")
        .json(&json!({ "title": "A" }))
        .await
        .json();
    assert_eq!(titles(&body), vec!["E", "B", "D", "G", "F"]);
}

#[tokio::test]
async fn test_malformed_upload_is_rejected() {
    let server = create_test_server(StubSource::offline(), StubMetadata::default());

    server
        .put("/api/v1/artifacts/similarity")
        .bytes(Bytes::from(similarity_pickle()))
        .await
        .assert_status_ok();

    let response = server
        .put("/api/v1/artifacts/movies")
        .bytes(Bytes::from_static(b"PK\x03\x04 definitely not a pickle"))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .get("/api/v1/movies")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_artifact_kind_is_bad_request() {
    let server = create_test_server(StubSource::offline(), StubMetadata::default());

    let response = server
        .put("/api/v1/artifacts/posters")
        .bytes(Bytes::from_static(b"whatever"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server(StubSource::offline(), StubMetadata::default());

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("ui-click-7"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "ui-click-7");

    let response = server.get("/health").await;
    let generated = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());
}
