//! HTTP surface for the dashboard.
//!
//! Endpoints:
//!   GET    /                              - dashboard page
//!   GET    /api/health                    - health check
//!   GET    /api/layout                    - controls and chart slots
//!   GET    /api/dataset                   - dataset manifest
//!   GET    /api/charts/pie?site=          - stateless pie chart
//!   GET    /api/charts/scatter?site=&low=&high= - stateless scatter chart
//!   POST   /api/sessions                  - open a session, initial render
//!   GET    /api/sessions/:id              - current control values
//!   POST   /api/sessions/:id/input        - change a control
//!   DELETE /api/sessions/:id              - close a session

use crate::charts::{compute_pie_chart, compute_scatter_chart, ChartSpec};
use crate::config::Config;
use crate::data::{Dataset, DatasetManifest};
use crate::filter::{PayloadRange, SiteSelector};
use crate::layout::DashboardLayout;
use crate::logging::{log, log_request, obj, v_str, Domain, Level};
use crate::session::{ChartUpdate, InputChange, SessionSnapshot, SessionStore};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub layout: Arc<DashboardLayout>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(dataset: Dataset, cfg: &Config) -> Self {
        let layout = DashboardLayout::build(&dataset, cfg.slider_step_kg, cfg.slider_mark_kg);
        Self {
            dataset: Arc::new(dataset),
            layout: Arc::new(layout),
            sessions: Arc::new(SessionStore::new(
                Duration::from_secs(cfg.session_ttl_secs),
                cfg.max_sessions,
            )),
        }
    }

    /// Initial slider value when a request leaves a bound out.
    fn default_range(&self) -> (f64, f64) {
        self.dataset.payload_bounds()
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/layout", get(layout))
        .route("/api/dataset", get(dataset_manifest))
        .route("/api/charts/pie", get(pie_chart))
        .route("/api/charts/scatter", get(scatter_chart))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/input", post(session_input))
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;
    log(
        Level::Info,
        Domain::System,
        "listening",
        obj(&[("addr", v_str(bind_addr)), ("msg", v_str(&format!("dashboard: http://{}/", bind_addr)))]),
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log(
            Level::Error,
            Domain::System,
            "signal_error",
            obj(&[("error", v_str(&err.to_string()))]),
        );
    }
    log(Level::Info, Domain::System, "shutdown", obj(&[]));
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "sessions": state.sessions.active_count() }))
}

pub async fn layout(State(state): State<AppState>) -> Json<DashboardLayout> {
    Json(state.layout.as_ref().clone())
}

pub async fn dataset_manifest(State(state): State<AppState>) -> Json<DatasetManifest> {
    Json(state.dataset.manifest())
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub site: Option<String>,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl ChartQuery {
    fn selector(&self) -> SiteSelector {
        self.site.as_deref().map(SiteSelector::parse).unwrap_or_default()
    }
}

/// Unwrap an extractor, turning axum's plain-text rejection into an [`ApiError`].
fn extracted<T, R: std::fmt::Display>(
    method: &str,
    path: &str,
    result: Result<T, R>,
) -> Result<T, ApiError> {
    result.map_err(|rejection| {
        log_request(method, path, 400);
        ApiError::bad_request(rejection.to_string())
    })
}

pub async fn pie_chart(
    State(state): State<AppState>,
    query: Result<Query<ChartQuery>, QueryRejection>,
) -> Result<Json<ChartSpec>, ApiError> {
    let Query(q) = extracted("GET", "/api/charts/pie", query)?;
    let spec = compute_pie_chart(&state.dataset, &q.selector());
    log_request("GET", "/api/charts/pie", 200);
    Ok(Json(spec))
}

pub async fn scatter_chart(
    State(state): State<AppState>,
    query: Result<Query<ChartQuery>, QueryRejection>,
) -> Result<Json<ChartSpec>, ApiError> {
    let Query(q) = extracted("GET", "/api/charts/scatter", query)?;
    let (min, max) = state.default_range();
    let range = PayloadRange::new(q.low.unwrap_or(min), q.high.unwrap_or(max)).map_err(|e| {
        log_request("GET", "/api/charts/scatter", 400);
        ApiError::bad_request(e)
    })?;
    let spec = compute_scatter_chart(&state.dataset, &q.selector(), &range);
    log_request("GET", "/api/charts/scatter", 200);
    Ok(Json(spec))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: String,
    pub updates: Vec<ChartUpdate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InputRequest {
    pub control: String,
    pub value: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InputResponse {
    pub updates: Vec<ChartUpdate>,
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let (session_id, updates) = state.sessions.create(&state.dataset);
    log_request("POST", "/api/sessions", 201);
    (StatusCode::CREATED, Json(SessionCreated { session_id, updates }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state.sessions.snapshot(&id).map(Json).ok_or_else(|| {
        log_request("GET", "/api/sessions/:id", 404);
        ApiError::not_found(format!("unknown session {}", id))
    })
}

pub async fn session_input(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<InputRequest>, JsonRejection>,
) -> Result<Json<InputResponse>, ApiError> {
    let Json(req) = extracted("POST", "/api/sessions/:id/input", body)?;
    let change = InputChange::decode(&req.control, req.value).map_err(|e| {
        log_request("POST", "/api/sessions/:id/input", 400);
        ApiError::bad_request(e)
    })?;
    let updates = state.sessions.apply(&id, &state.dataset, change).ok_or_else(|| {
        log_request("POST", "/api/sessions/:id/input", 404);
        ApiError::not_found(format!("unknown session {}", id))
    })?;
    log_request("POST", "/api/sessions/:id/input", 200);
    Ok(Json(InputResponse { updates }))
}

pub async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if state.sessions.remove(&id) {
        log_request("DELETE", "/api/sessions/:id", 204);
        StatusCode::NO_CONTENT
    } else {
        log_request("DELETE", "/api/sessions/:id", 404);
        StatusCode::NOT_FOUND
    }
}
