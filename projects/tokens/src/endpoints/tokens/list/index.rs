use std::sync::Arc;

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;

use crate::{endpoints::error_response, state::AppState};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Tokens are not loaded yet")]
    ServiceNotReady,
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::ServiceNotReady => {
                error_response(StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
        }
    }
}

/// Axum handler: GET /tokens
pub async fn handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match state.registry.snapshot().await {
        Some(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        None => HandlerError::ServiceNotReady.into_response(),
    }
}
