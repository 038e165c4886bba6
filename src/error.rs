use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// JSON body of every non-2xx answer: `{"error": "...", "code": "..."}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    pub fn with_code(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
        }
    }
}

/// Upstream failures (OpenWeatherMap lookups) mapped onto HTTP
pub trait HttpError: std::error::Error {
    fn status_code(&self) -> StatusCode;

    /// e.g. "CITY_NOT_FOUND", "FORECAST_UNAVAILABLE"
    fn error_code(&self) -> Option<&'static str> {
        None
    }
}

/// Log the failure once and render it as an `ErrorResponse`.
/// The body carries the error's display text.
pub fn into_response<E: HttpError>(err: E) -> Response {
    let status = err.status_code();
    let code = err.error_code();
    let message = err.to_string();

    if status.is_server_error() {
        tracing::error!(error = %message, status = %status, code = ?code, "Upstream lookup failed");
    } else {
        tracing::warn!(error = %message, status = %status, code = ?code, "Lookup rejected");
    }

    let body = ErrorResponse {
        error: message,
        code: code.map(str::to_string),
    };

    (status, Json(body)).into_response()
}

/// `impl IntoResponse` via [`into_response`], for handler return types
#[macro_export]
macro_rules! impl_into_response {
    ($error_type:ty) => {
        impl axum::response::IntoResponse for $error_type {
            fn into_response(self) -> axum::response::Response {
                $crate::error::into_response(self)
            }
        }
    };
}
