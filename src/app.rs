use crate::errors::AppError;
use crate::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Per-client limits for form submissions.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Time to replenish one request of the quota.
    pub period: Duration,
    pub burst_size: u32,
}

impl Default for RateLimit {
    /// 10 requests/second per IP, burst of 20
    fn default() -> Self {
        Self {
            period: Duration::from_millis(100),
            burst_size: 20,
        }
    }
}

/// Read-only routes: the page, autocomplete and health check.
pub fn page_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/modelos", get(handlers::modelos))
        .route("/health", get(handlers::health))
}

/// Form submissions that change the session's view.
pub fn form_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/modo/:mode", post(handlers::switch_mode))
        .route("/comparar", post(handlers::comparar))
        .route("/recomendar", post(handlers::recomendar))
        .route(
            "/notificacoes/:id/fechar",
            post(handlers::dismiss_notification),
        )
        // Forms are tiny; 64KB is plenty
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(64 * 1024)))
}

/// Complete application router.
///
/// With `rate_limit` set, form submissions are throttled per client IP
/// (taken from `X-Forwarded-For`/`X-Real-Ip`, then the peer address, so
/// the server must be served with connect info). The page and autocomplete
/// are never throttled.
pub fn router(state: Arc<AppState>, rate_limit: Option<RateLimit>) -> Result<Router, AppError> {
    let mut forms = form_routes();
    if let Some(limit) = rate_limit {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .period(limit.period)
                .burst_size(limit.burst_size)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .ok_or_else(|| {
                    AppError::InternalError(format!("Invalid rate limiter config: {:?}", limit))
                })?,
        );
        forms = forms.layer(ServiceBuilder::new().layer(GovernorLayer {
            config: governor_conf,
        }));
    }

    Ok(page_routes()
        .merge(forms)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
