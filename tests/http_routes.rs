//! Integration tests for the HTTP surface.
//!
//! The router runs against an in-memory account store and a canned catalog,
//! so nothing here touches the network.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use persona_books::{
    accounts::{AccountStore, password::PasswordHashing},
    catalog::{
        BookCatalog, ImageLinks, VolumeInfo,
        recommend::{KeywordTable, Recommender},
    },
    config::AuthConfig,
    error::{PersonaError, Result},
    http::{AppState, router},
    quiz::Scorer,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

#[derive(Default)]
struct CannedCatalog {
    queries: Mutex<Vec<(String, u32)>>,
}

#[async_trait]
impl BookCatalog for CannedCatalog {
    async fn search_volumes(&self, query: &str, max_results: u32) -> Result<Vec<VolumeInfo>> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        Ok(vec![
            VolumeInfo {
                title: Some("The Art of War".to_string()),
                authors: Some(vec!["Sun Tzu".to_string()]),
                description: Some("Ancient strategy.".to_string()),
                image_links: Some(ImageLinks {
                    thumbnail: Some("http://img/war".to_string()),
                }),
                preview_link: Some("http://preview/war".to_string()),
                info_link: Some("http://info/war".to_string()),
            },
            VolumeInfo::default(),
        ])
    }
}

struct DownCatalog;

#[async_trait]
impl BookCatalog for DownCatalog {
    async fn search_volumes(&self, _query: &str, _max_results: u32) -> Result<Vec<VolumeInfo>> {
        Err(PersonaError::Catalog {
            message: "connection refused".to_string(),
        })
    }
}

fn app_with(catalog: Arc<dyn BookCatalog>) -> Router {
    let hashing = PasswordHashing::new(&AuthConfig {
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
    })
    .unwrap();
    let state = AppState {
        scorer: Arc::new(Scorer::default()),
        recommender: Arc::new(Recommender::new(catalog, KeywordTable::default(), 10, 20)),
        accounts: AccountStore::open_in_memory(hashing).unwrap(),
    };
    router(state, Duration::from_secs(10))
}

fn app() -> Router {
    app_with(Arc::new(CannedCatalog::default()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_submit_scores_answers() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/personality/submit",
            json!({"answers": {"q1": "Analyze it logically", "q3": "Data-driven"}}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "type": "The Thinker",
            "score": {"thinker": 2, "explorer": 0, "dreamer": 0, "strategist": 0}
        })
    );
}

#[tokio::test]
async fn test_submit_strategist_example() {
    let app = app();
    let (_, body) = send(
        &app,
        post_json(
            "/api/personality/submit",
            json!({"answers": {"q1": "Trust my intuition", "q2": "I like structure and clear plans"}}),
        ),
    )
    .await;
    assert_eq!(body["type"], "The Strategist");
    assert_eq!(body["score"]["strategist"], 2);
}

#[tokio::test]
async fn test_submit_ignores_junk() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/personality/submit",
            json!({"answers": {"q99": "Analyze it logically", "q1": 3, "q2": null}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "The Thinker");
    assert_eq!(
        body["score"],
        json!({"thinker": 0, "explorer": 0, "dreamer": 0, "strategist": 0})
    );

    let (_, body) = send(&app, post_json("/api/personality/submit", json!({}))).await;
    assert_eq!(body["type"], "The Thinker");
}

#[tokio::test]
async fn test_submit_rejects_malformed_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/personality/submit")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_questions_listing() {
    let app = app();
    let (status, body) = send(&app, get("/api/personality/questions")).await;
    assert_eq!(status, StatusCode::OK);

    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 8);
    assert_eq!(questions[5]["id"], "q6");
    assert_eq!(questions[5]["options"][0], "The planner");
    assert_eq!(body["archetypes"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_recommend_by_personality() {
    let catalog = Arc::new(CannedCatalog::default());
    let app = app_with(catalog.clone());

    let (status, body) = send(&app, get("/api/books/recommend/The%20Strategist")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["books"][0],
        json!({
            "title": "The Art of War",
            "author": "Sun Tzu",
            "link": "http://info/war",
            "thumbnail": "http://img/war"
        })
    );
    assert_eq!(
        body["books"][1],
        json!({"title": null, "author": "", "link": null, "thumbnail": null})
    );
    assert_eq!(
        catalog.queries.lock().unwrap()[0],
        ("strategy leadership planning".to_string(), 10)
    );
}

#[tokio::test]
async fn test_search_by_category() {
    let catalog = Arc::new(CannedCatalog::default());
    let app = app_with(catalog.clone());

    let (status, body) = send(&app, get("/api/books/search/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["books"][1],
        json!({"title": "Unknown Title", "author": "Unknown Author", "link": "#"})
    );
    assert!(body["books"][0].get("thumbnail").is_none());
    assert_eq!(
        catalog.queries.lock().unwrap()[0],
        ("history".to_string(), 20)
    );
}

#[tokio::test]
async fn test_detailed_recommendation_query() {
    let app = app();
    let (status, body) = send(&app, get("/api/recommendation?personality=The%20Dreamer")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["personality"], "The Dreamer");
    assert_eq!(body["books"][0]["authors"], json!(["Sun Tzu"]));
    assert_eq!(body["books"][0]["previewLink"], "http://preview/war");

    let (status, body) = send(&app, get("/api/recommendation")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "personality query param is required.");
}

#[tokio::test]
async fn test_catalog_failure_is_structured() {
    let app = app_with(Arc::new(DownCatalog));
    let (status, body) = send(&app, get("/api/books/recommend/General")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "failed to fetch");
    assert!(body["details"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/register",
            json!({"username": "ada", "email": "ada@example.com", "password": "engine"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["username"], "ada");

    let (status, body) = send(
        &app,
        post_json(
            "/api/login",
            json!({"email": "ada@example.com", "password": "engine"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ada@example.com");

    let (status, _) = send(&app, get("/api/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_and_bad_login() {
    let app = app();
    let register = json!({"username": "ada", "email": "ada@example.com", "password": "engine"});
    send(&app, post_json("/api/register", register.clone())).await;

    let (status, body) = send(&app, post_json("/api/register", register)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");

    let (status, body) = send(
        &app,
        post_json(
            "/api/login",
            json!({"email": "ada@example.com", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid credentials");
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/personality/submit")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
