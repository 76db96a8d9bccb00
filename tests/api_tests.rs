use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use repo_recommender::api::{create_router, AppState};
use repo_recommender::db::JsonStore;
use repo_recommender::error::{AppError, AppResult};
use repo_recommender::models::RepositoryRecord;
use repo_recommender::services::{
    LexiconTagger, Recommender, RecommenderSettings, RepositorySource, SourceListing,
};

/// Source that serves canned repositories for one known user
struct FixedSource {
    username: &'static str,
    records: Vec<RepositoryRecord>,
}

#[async_trait::async_trait]
impl RepositorySource for FixedSource {
    async fn user_repositories(&self, username: &str) -> AppResult<SourceListing> {
        if username != self.username {
            return Err(AppError::NotFound(format!("No repositories for {}", username)));
        }
        Ok(SourceListing {
            records: self.records.clone(),
            skipped: vec![],
        })
    }

    async fn candidate_repositories(&self, limit: usize) -> AppResult<SourceListing> {
        Ok(SourceListing {
            records: repositories().into_iter().take(limit).collect(),
            skipped: vec![],
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("repo-recommender-api-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_json(dir: &PathBuf, file: &str, value: &Value) {
    std::fs::write(dir.join(file), serde_json::to_vec(value).unwrap()).unwrap();
}

fn repositories() -> Vec<RepositoryRecord> {
    vec![
        RepositoryRecord::new("b", "java-tool").with_language("Java", 80),
        RepositoryRecord::new("a", "ml-kit")
            .with_language("Python", 50)
            .with_topic("ml")
            .with_topic("data"),
        RepositoryRecord::new("c", "web").with_language("Ruby", 10),
    ]
}

fn create_test_server(dir: &PathBuf) -> TestServer {
    let recommender = Recommender::new(
        RecommenderSettings::default(),
        Arc::new(LexiconTagger::default()),
        &repositories(),
    );
    let source = FixedSource {
        username: "newbie",
        records: vec![RepositoryRecord::new("newbie", "scripts").with_language("Python", 5)],
    };
    let state = AppState::new(recommender, JsonStore::new(dir), Arc::new(source));
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let dir = temp_dir();
    let server = create_test_server(&dir);

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["repositories"], 3);
    assert!(response.headers().contains_key("x-request-id"));

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let dir = temp_dir();
    let server = create_test_server(&dir);

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static("abc-123"),
        )
        .await;
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_recommendations_ranked() {
    let dir = temp_dir();
    write_json(
        &dir,
        "me.json",
        &json!([{
            "owner": "me",
            "repo": "notebooks",
            "languages": {"Python": 100},
            "topics": ["ml"]
        }]),
    );
    let server = create_test_server(&dir);

    let response = server.get("/api/v1/recommendations/me").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["username"], "me");
    assert_eq!(body["total"], 3);
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 3);
    assert_eq!(recommendations[0]["repository"], "a/ml-kit");
    assert_eq!(recommendations[0]["score"], 1.0);
    assert!(body["generated_at"].is_string());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_recommendations_limit() {
    let dir = temp_dir();
    write_json(&dir, "me.json", &json!([{"owner": "me", "repo": "x", "topics": ["ml"]}]));
    let server = create_test_server(&dir);

    let response = server
        .get("/api/v1/recommendations/me")
        .add_query_param("limit", 1)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["total"], 3);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 1);

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_unknown_user_not_found() {
    let dir = temp_dir();
    let server = create_test_server(&dir);

    let response = server.get("/api/v1/recommendations/ghost").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("ghost"));

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_malformed_user_file_rejected() {
    let dir = temp_dir();
    write_json(&dir, "broken.json", &json!({"owner": "broken"}));
    let server = create_test_server(&dir);

    let response = server.get("/api/v1/recommendations/broken").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_invalid_username_rejected() {
    let dir = temp_dir();
    let server = create_test_server(&dir);

    let response = server.get("/api/v1/recommendations/..hidden").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_extract_then_recommend() {
    let dir = temp_dir();
    let server = create_test_server(&dir);

    let response = server.post("/api/v1/users/newbie/extract").await;
    response.assert_status(StatusCode::CREATED);
    let summary: Value = response.json();
    assert_eq!(summary["username"], "newbie");
    assert_eq!(summary["repositories"], 1);
    assert!(dir.join("newbie.json").exists());

    let response = server.get("/api/v1/recommendations/newbie").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommendations"][0]["repository"], "a/ml-kit");

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_extract_unknown_user() {
    let dir = temp_dir();
    let server = create_test_server(&dir);

    let response = server.post("/api/v1/users/stranger/extract").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(!dir.join("stranger.json").exists());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_extract_repositories_writes_dataset() {
    let dir = temp_dir();
    let server = create_test_server(&dir);

    let response = server
        .post("/api/v1/repositories/extract")
        .add_query_param("limit", 2)
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["limit"], 2);
    assert_eq!(body["repositories"], 2);
    assert_eq!(body["skipped"], 0);

    let dataset = JsonStore::new(&dir).load_repositories().await.unwrap();
    let names: Vec<String> = dataset.iter().map(|r| r.full_name()).collect();
    assert_eq!(names, vec!["b/java-tool", "a/ml-kit"]);

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_extract_repositories_requires_limit() {
    let dir = temp_dir();
    let server = create_test_server(&dir);

    let response = server.post("/api/v1/repositories/extract").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/repositories/extract")
        .add_query_param("limit", 0)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(!dir.join("data.json").exists());

    std::fs::remove_dir_all(dir).ok();
}
