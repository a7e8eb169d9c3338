use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::checker::HttpChecker;
use crate::models::{Status, Website, Websites};
use crate::state::StatusTable;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub table: StatusTable,
    pub checker: HttpChecker,
    pub shutdown: watch::Receiver<bool>,
}

/// Error surface of the HTTP API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was cancelled before the handler did any work.
    #[error("request cancelled: {0}")]
    Cancelled(&'static str),
    /// The request body was missing or not the expected JSON shape.
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Cancelled(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// Request-scoped cancellation check, run first in every handler. A request
/// that arrives once the shutdown signal has fired does not touch the table.
fn ensure_live(state: &AppState) -> Result<(), ApiError> {
    if *state.shutdown.borrow() {
        return Err(ApiError::Cancelled("server is shutting down"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    name: Option<String>,
}

/// GET / — liveness probe.
async fn root(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    ensure_live(&state)?;
    Ok("website monitor is running")
}

/// GET /websites — the whole table, or one site checked on the spot when
/// `?name=` is given.
async fn get_websites(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<HashMap<String, Status>>, ApiError> {
    ensure_live(&state)?;

    match query.name {
        Some(name) if !name.is_empty() => {
            let status = state.checker.check(&name).await;
            state.table.set(name.clone(), status).await;
            Ok(Json(HashMap::from([(name, status)])))
        }
        _ => Ok(Json(state.table.all().await)),
    }
}

/// POST /websites — load a batch of sites, checking each synchronously.
async fn load_websites(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_live(&state)?;

    let request: Websites = serde_json::from_str(&body)?;
    for site in &request.websites {
        let status = state.checker.check(site).await;
        state.table.set(site.clone(), status).await;
    }

    info!(count = request.websites.len(), "websites updated");
    Ok(Json(serde_json::json!({
        "message": "websites updated successfully"
    })))
}

/// POST /checksitestatus — check one site and report its status.
async fn check_site_status(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<HashMap<String, Status>>, ApiError> {
    ensure_live(&state)?;

    let request: Website = serde_json::from_str(&body)?;
    let status = state.checker.check(&request.website).await;
    state.table.set(request.website.clone(), status).await;
    Ok(Json(HashMap::from([(request.website, status)])))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/websites", get(get_websites).post(load_websites))
        .route("/checksitestatus", post(check_site_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listener and serves until the shutdown signal fires.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let mut shutdown = state.shutdown.clone();
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("API listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> (watch::Sender<bool>, AppState) {
        let (tx, rx) = watch::channel(false);
        let state = AppState {
            table: StatusTable::new(),
            checker: HttpChecker::new(2).unwrap(),
            shutdown: rx,
        };
        (tx, state)
    }

    #[tokio::test]
    async fn root_acknowledges_while_live() {
        let (_tx, state) = test_state();
        let body = root(State(state)).await.unwrap();
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn handlers_reject_cancelled_requests() {
        let (tx, state) = test_state();
        tx.send(true).unwrap();

        let err = root(State(state.clone())).await.unwrap_err();
        assert!(matches!(err, ApiError::Cancelled(_)));

        // The guard short-circuits before any table write.
        let err = load_websites(State(state.clone()), r#"{"websites":["x"]}"#.into())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled(_)));
        assert!(state.table.is_empty().await);
    }

    #[tokio::test]
    async fn malformed_body_maps_to_400() {
        let (_tx, state) = test_state();
        let err = load_websites(State(state), "not json".into())
            .await
            .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cancelled_maps_to_500() {
        let response = ApiError::Cancelled("server is shutting down")
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn get_without_name_returns_table_snapshot() {
        let (_tx, state) = test_state();
        state.table.set("http://a.example", Status::Down).await;

        let Json(body) = get_websites(State(state), Query(StatusQuery { name: None }))
            .await
            .unwrap();
        assert_eq!(body, HashMap::from([("http://a.example".into(), Status::Down)]));
    }

    #[tokio::test]
    async fn empty_name_behaves_like_no_name() {
        let (_tx, state) = test_state();
        state.table.set("http://a.example", Status::Up).await;

        let Json(body) = get_websites(
            State(state),
            Query(StatusQuery {
                name: Some(String::new()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(body.len(), 1);
    }
}
