use crate::handlers::AppState;
use crate::view::ViewState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const COOKIE_NAME: &str = "carros_sessao";

/// The browser session's view state, looked up (or created) from the
/// session cookie.
pub struct Session {
    pub id: String,
    pub view: Arc<Mutex<ViewState>>,
}

impl Session {
    /// `Set-Cookie` value that keeps the browser on this session.
    pub fn cookie(&self) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            COOKIE_NAME, self.id
        )
    }
}

/// Session id from the `Cookie` header, when it holds a valid uuid.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(COOKIE_NAME)?.strip_prefix('='))
        .find_map(|id| Uuid::parse_str(id.trim()).ok())
        .map(|id| id.to_string())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let id = session_id(&parts.headers).unwrap_or_else(|| {
            let id = Uuid::new_v4().to_string();
            tracing::debug!("Starting session {}", id);
            id
        });
        let view = state
            .sessions
            .get_with(id.clone(), async { Arc::new(Mutex::new(state.new_view())) })
            .await;
        Ok(Session { id, view })
    }
}
