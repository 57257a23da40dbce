use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// The car service could not be reached (connection error, timeout, open circuit).
    NetworkFailure(String),
    /// The car service answered with a non-2xx status.
    HttpError {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body, kept for logging.
        body: String,
    },
    /// The car service answered 2xx but the body could not be decoded.
    InvalidResponse(String),
    /// A well-formed response with zero matches.
    EmptyResult(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Internal error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Returns the innermost error, skipping context wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the failure comes from the service being unavailable or broken,
    /// in which case the frontend substitutes example data.
    pub fn falls_back_to_examples(&self) -> bool {
        matches!(
            self.root(),
            AppError::NetworkFailure(_) | AppError::HttpError { .. } | AppError::InvalidResponse(_)
        )
    }

    /// Whether the failure should count against the circuit breaker.
    ///
    /// Client errors (4xx) are the caller's fault and leave the breaker closed.
    pub fn is_service_failure(&self) -> bool {
        match self.root() {
            AppError::NetworkFailure(_) => true,
            AppError::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NetworkFailure(msg) => write!(f, "Network failure: {}", msg),
            AppError::HttpError { status, body } => {
                write!(f, "Car service returned {}: {}", status, body)
            }
            AppError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            AppError::EmptyResult(msg) => write!(f, "Empty result: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NetworkFailure(msg) => {
                tracing::error!("Car service unreachable: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Car service unavailable".to_string(),
                )
            }
            AppError::HttpError { status, body } => {
                tracing::error!("Car service error {}: {}", status, body);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                )
            }
            AppError::InvalidResponse(msg) => {
                tracing::error!("Car service sent an invalid response: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                )
            }
            AppError::EmptyResult(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                return (**source).clone().into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::HttpError {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            AppError::NetworkFailure(err.to_string())
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    ///
    /// # Arguments
    ///
    /// * `f` - A closure that produces the context message.
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
