//! HTTP transport module for persona-books
//!
//! Axum router for the quiz, book lookup, and account endpoints. All bodies
//! are JSON; errors are rendered by `PersonaError`'s `IntoResponse`.

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::{ServiceBuilder, timeout::TimeoutLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::{
    accounts::{AccountStore, Credentials, Registration},
    catalog::recommend::Recommender,
    error::{PersonaError, Result},
    quiz::{Scorer, labels::archetypes},
};

/// Shared state for HTTP handlers; every table inside is read-only.
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<Scorer>,
    pub recommender: Arc<Recommender>,
    pub accounts: AccountStore,
}

/// Quiz submission body. Non-string answers are treated as unrecognized.
#[derive(Debug, Deserialize)]
pub struct QuizSubmission {
    #[serde(default)]
    pub answers: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub personality: Option<String>,
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

pub async fn questions_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "questions": state.scorer.rules().views(),
        "archetypes": archetypes(),
    }))
}

pub async fn submit_handler(
    State(state): State<AppState>,
    Json(submission): Json<QuizSubmission>,
) -> impl IntoResponse {
    let pairs = submission
        .answers
        .iter()
        .filter_map(|(q, a)| a.as_str().map(|a| (q.as_str(), a)));
    let result = state.scorer.score(pairs);
    info!(
        "Quiz scored as {} ({} recognized answers)",
        result.label,
        result.score.total()
    );
    Json(result)
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    Path(personality_type): Path<String>,
) -> Result<Json<Value>> {
    let books = state
        .recommender
        .recommend_by_personality(&personality_type)
        .await?;
    Ok(Json(json!({ "books": books })))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Value>> {
    let books = state.recommender.search_by_category(&category).await?;
    Ok(Json(json!({ "books": books })))
}

/// Query-string variant returning full volume details.
pub async fn recommendation_handler(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Response> {
    let Some(personality) = query.personality.filter(|p| !p.trim().is_empty()) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "personality query param is required." })),
        )
            .into_response());
    };
    let books = state
        .recommender
        .volumes_for_personality(&personality)
        .await?;
    Ok(Json(json!({ "personality": personality, "books": books })).into_response())
}

pub async fn register_handler(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<Json<Value>> {
    let account = state.accounts.register(registration).await?;
    Ok(Json(json!({
        "message": "User registered successfully",
        "user": account,
    })))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Value>> {
    let grant = state.accounts.login(credentials).await?;
    Ok(Json(json!({
        "message": "Login successful",
        "user": grant.account,
        "access_token": grant.access_token,
        "token_type": "bearer",
    })))
}

pub async fn me_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(PersonaError::InvalidCredentials)?;
    let account = state.accounts.account_for_token(token).await?;
    Ok(Json(json!({ "user": account })))
}

async fn handle_timeout(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "detail": "Request timed out" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": format!("Unhandled internal error: {}", err) })),
        )
    }
}

/// Build the application router. `request_timeout` bounds every handler.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/personality/questions", get(questions_handler))
        .route("/api/personality/submit", post(submit_handler))
        .route(
            "/api/books/recommend/:personality_type",
            get(recommend_handler),
        )
        .route("/api/books/search/:category", get(search_handler))
        .route("/api/recommendation", get(recommendation_handler))
        .route("/api/register", post(register_handler))
        .route("/api/login", post(login_handler))
        .route("/api/me", get(me_handler))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn start_http_server(
    state: AppState,
    bind: std::net::SocketAddr,
    request_timeout: Duration,
) -> anyhow::Result<()> {
    let app = router(state, request_timeout);

    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
