//! HTTP surface for the dashboard.
//!
//! Endpoints:
//!   GET  /                   - dashboard page
//!   GET  /api/layout         - layout description
//!   GET  /api/state          - current view state
//!   GET  /api/charts         - every chart for the current view state
//!   GET  /api/charts/{id}    - one chart; `site`, `lo`, `hi` override the view state
//!   POST /api/input          - apply an input event, returns dependent charts
//!   GET  /api/manifest       - dataset manifest
//!   GET  /api/health         - health check

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::data::{Dataset, DatasetManifest};
use crate::layout::Layout;
use crate::logging::{self, log, log_input, log_request, obj, v_num, v_str, Domain, Level};
use crate::reconcile::{ChartId, InputId, Reconciler, RenderedChart};
use crate::view::{ControlPanel, InputEvent, PayloadRange, ViewError, ViewState};

#[derive(Clone)]
pub struct AppState {
    pub reconciler: Reconciler,
    pub panel: Arc<ControlPanel>,
    pub layout: Arc<Layout>,
    pub page: Arc<String>,
    pub manifest: Option<Arc<DatasetManifest>>,
}

impl AppState {
    pub fn new(config: &Config, dataset: Dataset, manifest: Option<DatasetManifest>) -> Self {
        let panel = ControlPanel::new(&dataset, config.slider);
        let layout = Layout::build(&panel);
        let page = layout.render_html();
        Self {
            reconciler: Reconciler::new(Arc::new(dataset), config.pie_aggregate),
            panel: Arc::new(panel),
            layout: Arc::new(layout),
            page: Arc::new(page),
            manifest: manifest.map(Arc::new),
        }
    }
}

/// Input event as posted by the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input", content = "value")]
pub enum InputRequest {
    #[serde(rename = "site-dropdown")]
    SiteDropdown(String),
    #[serde(rename = "payload-slider")]
    PayloadSlider([f64; 2]),
}

impl InputRequest {
    pub fn input_id(&self) -> InputId {
        match self {
            InputRequest::SiteDropdown(_) => InputId::SiteDropdown,
            InputRequest::PayloadSlider(_) => InputId::PayloadSlider,
        }
    }

    fn raw_value(&self) -> Value {
        match self {
            InputRequest::SiteDropdown(v) => v_str(v),
            InputRequest::PayloadSlider([lo, hi]) => json!([lo, hi]),
        }
    }
}

impl From<InputRequest> for InputEvent {
    fn from(req: InputRequest) -> Self {
        match req {
            InputRequest::SiteDropdown(v) => InputEvent::SiteSelected(v),
            InputRequest::PayloadSlider([lo, hi]) => InputEvent::PayloadRangeChanged { lo, hi },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputResponse {
    pub state: ViewState,
    pub charts: Vec<RenderedChart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuery {
    pub site: Option<String>,
    pub lo: Option<f64>,
    pub hi: Option<f64>,
}

type ApiError = (StatusCode, String);

fn bad_request(err: ViewError) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/layout", get(get_layout))
        .route("/api/state", get(get_state))
        .route("/api/charts", get(get_charts))
        .route("/api/charts/{id}", get(get_chart))
        .route("/api/input", post(post_input))
        .route("/api/manifest", get(get_manifest))
        .route("/api/health", get(health))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let route = req.uri().path().to_string();
    let response = next.run(req).await;
    log_request(&method, &route, response.status().as_u16());
    response
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.as_ref().clone())
}

pub async fn get_layout(State(state): State<AppState>) -> Json<Layout> {
    Json(state.layout.as_ref().clone())
}

pub async fn get_state(State(state): State<AppState>) -> Json<ViewState> {
    Json(state.panel.current())
}

pub async fn get_charts(State(state): State<AppState>) -> Json<Vec<RenderedChart>> {
    Json(state.reconciler.render_all(&state.panel.current()))
}

/// Stateless render: query parameters override the current view state for
/// this response only.
pub async fn get_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<RenderedChart>, ApiError> {
    let chart = id
        .parse::<ChartId>()
        .map_err(|msg| (StatusCode::NOT_FOUND, msg))?;
    let mut view = state.panel.current();
    if let Some(site) = query.site {
        view.site = site
            .parse()
            .map_err(|_| bad_request(ViewError::UnknownSite(site.clone())))?;
    }
    if query.lo.is_some() || query.hi.is_some() {
        let lo = query.lo.unwrap_or(view.payload.lo());
        let hi = query.hi.unwrap_or(view.payload.hi());
        view.payload = PayloadRange::new(lo, hi).map_err(bad_request)?;
    }
    Ok(Json(state.reconciler.render(chart, &view)))
}

pub async fn post_input(
    State(state): State<AppState>,
    Json(req): Json<InputRequest>,
) -> Result<Json<InputResponse>, ApiError> {
    let input = req.input_id();
    let raw = req.raw_value();
    match state.panel.apply(req.into()) {
        Ok(view) => {
            log_input(input.element_id(), raw, true, None);
            Ok(Json(InputResponse {
                state: view,
                charts: state.reconciler.reconcile(input, &view),
            }))
        }
        Err(err) => {
            log_input(input.element_id(), raw, false, Some(&err.to_string()));
            Err(bad_request(err))
        }
    }
}

pub async fn get_manifest(
    State(state): State<AppState>,
) -> Result<Json<DatasetManifest>, ApiError> {
    state
        .manifest
        .as_ref()
        .map(|m| Json(m.as_ref().clone()))
        .ok_or((StatusCode::NOT_FOUND, "no manifest".to_string()))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "rows": state.reconciler.dataset().len(),
        "run_id": logging::run_id(),
    }))
}

/// Logs every published view state.
pub fn spawn_view_logger(mut rx: watch::Receiver<ViewState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let view = *rx.borrow_and_update();
            log(
                Level::Info,
                Domain::View,
                "view_state.published",
                obj(&[
                    ("site", v_str(view.site.as_str())),
                    ("payload_lo", v_num(view.payload.lo())),
                    ("payload_hi", v_num(view.payload.hi())),
                ]),
            );
        }
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log(
            Level::Error,
            Domain::System,
            "signal_error",
            obj(&[("error", v_str(&err.to_string()))]),
        );
        std::future::pending::<()>().await;
    }
}

/// Bind, serve until Ctrl-C, then emit the session summary.
pub async fn serve(config: Config, state: AppState) -> Result<()> {
    let watcher = spawn_view_logger(state.panel.subscribe());
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.bind_addr))?;
    let addr = listener.local_addr()?;

    log(
        Level::Info,
        Domain::Http,
        "listening",
        obj(&[
            ("msg", v_str(&format!("Dashboard running at http://{}", addr))),
            ("addr", v_str(&addr.to_string())),
        ]),
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    watcher.abort();
    logging::log_session_summary();
    log(Level::Info, Domain::System, "shutdown", obj(&[]));
    logging::flush();
    Ok(())
}
