use crate::api_client::{normalize_model_ids, CarApiClient};
use crate::config::Config;
use crate::errors::AppError;
use crate::filters::FilterForm;
use crate::pages::{self, PageContext};
use crate::search::{self, Catalog, CATALOG_FAILED};
use crate::session::Session;
use crate::view::{Mode, NoticeLevel, ViewState};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use moka::future::Cache;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the car comparison/recommendation service.
    pub api: CarApiClient,
    /// Types and fuels loaded at startup; never mutated afterwards.
    pub catalog: Arc<Catalog>,
    /// Per-browser view state keyed by session cookie.
    pub sessions: Cache<String, Arc<Mutex<ViewState>>>,
}

impl AppState {
    pub fn new(config: Config, api: CarApiClient, catalog: Catalog) -> Self {
        let sessions = Cache::builder()
            .time_to_idle(config.session_ttl())
            .max_capacity(10_000)
            .build();
        Self {
            config,
            api,
            catalog: Arc::new(catalog),
            sessions,
        }
    }

    /// Fresh view state for a new session.
    pub fn new_view(&self) -> ViewState {
        let mut view = ViewState::new(self.config.notification_ttl());
        if self.catalog.load_failed {
            view.notify(NoticeLevel::Error, CATALOG_FAILED, Utc::now());
        }
        view
    }
}

/// Redirects back to the page, keeping the session cookie.
fn back_to_page(session: &Session) -> Response {
    (
        [(header::SET_COOKIE, session.cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "carros-web",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /
///
/// Renders the page for the session's current mode.
pub async fn index(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let html = {
        let mut view = session.view.lock().await;
        let notices = view.active_notices(Utc::now()).to_vec();
        pages::render_page(&PageContext {
            mode: view.mode(),
            catalog: &state.catalog,
            notices: &notices,
            results: view.results(),
            pending: view.is_pending(),
            notice_ttl_ms: state.config.notification_ttl().as_millis() as u64,
        })
    };
    ([(header::SET_COOKIE, session.cookie())], Html(html)).into_response()
}

/// POST /modo/:mode
pub async fn switch_mode(session: Session, Path(mode): Path<String>) -> Response {
    match mode.parse::<Mode>() {
        Ok(mode) => {
            session.view.lock().await.switch_mode(mode);
            back_to_page(&session)
        }
        Err(e) => {
            tracing::warn!("Rejected mode switch: {}", e);
            (StatusCode::NOT_FOUND, e).into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CompararForm {
    #[serde(default)]
    pub modelo1: String,
    #[serde(default)]
    pub modelo2: String,
    #[serde(default)]
    pub modelo3: String,
}

/// POST /comparar
///
/// Validates the selection, then compares through the service. The view
/// lock is not held while the service is awaited.
pub async fn comparar(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<CompararForm>,
) -> Response {
    let ids = vec![form.modelo1, form.modelo2, form.modelo3];

    let (token, ids) = {
        let mut view = session.view.lock().await;
        match normalize_model_ids(&ids) {
            Ok(ids) => (view.begin(Mode::Comparar), ids),
            Err(e) => {
                let message = match e {
                    AppError::BadRequest(msg) => msg,
                    other => other.to_string(),
                };
                view.notify(NoticeLevel::Error, message, Utc::now());
                return back_to_page(&session);
            }
        }
    };

    let outcome = search::run_comparison(&state.api, &ids, state.config.example_fallback).await;
    session.view.lock().await.complete(token, outcome, Utc::now());
    back_to_page(&session)
}

/// POST /recomendar
///
/// The body is decoded by hand since checkbox groups repeat field names.
pub async fn recomendar(
    State(state): State<Arc<AppState>>,
    session: Session,
    body: String,
) -> Response {
    let filtros = FilterForm::parse(&body).to_filtros();
    let token = session.view.lock().await.begin(Mode::Encontrar);

    let outcome =
        search::run_recommendation(&state.api, &filtros, state.config.example_fallback).await;
    session.view.lock().await.complete(token, outcome, Utc::now());
    back_to_page(&session)
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelosQuery {
    #[serde(default)]
    pub busca: String,
}

/// GET /modelos?busca=
///
/// `<option>` fragment for the autocomplete datalist. Short queries and
/// empty matches both yield an empty fragment.
pub async fn modelos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelosQuery>,
) -> Result<Html<String>, AppError> {
    let models = state.api.modelos(&query.busca).await?;
    tracing::debug!("{} suggestions for '{}'", models.len(), query.busca);
    Ok(Html(pages::render_suggestions(&models)))
}

/// POST /notificacoes/:id/fechar
pub async fn dismiss_notification(session: Session, Path(id): Path<Uuid>) -> Response {
    if !session.view.lock().await.dismiss(id) {
        tracing::debug!("Notification {} already gone", id);
    }
    back_to_page(&session)
}
