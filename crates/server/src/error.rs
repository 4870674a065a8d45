use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pith_core::error::ErrorEnvelope;
use pith_core::ChannelError;
use tracing::warn;

/// Newtype wrapper so we can implement `IntoResponse` in this crate.
pub struct AppError(pub ChannelError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(error = %self.0, "request failed");
        }
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

impl From<ChannelError> for AppError {
    fn from(e: ChannelError) -> Self {
        Self(e)
    }
}
