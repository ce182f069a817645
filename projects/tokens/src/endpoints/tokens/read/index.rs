use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use thiserror::Error;

use crate::{endpoints::error_response, registry::queries::find_token_by_id, state::AppState};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Tokens are not loaded yet")]
    ServiceNotReady,
    #[error("Token not found")]
    TokenNotFound,
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            HandlerError::ServiceNotReady => StatusCode::SERVICE_UNAVAILABLE,
            HandlerError::TokenNotFound => StatusCode::NOT_FOUND,
        };

        error_response(status, self.to_string())
    }
}

/// Axum handler: GET /tokens/{id}
///
/// A non-numeric id cannot match any token and answers 404 like a miss.
pub async fn handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> impl IntoResponse {
    let registry = state.registry.lock().await;
    let Some(tokens) = registry.as_deref() else {
        return HandlerError::ServiceNotReady.into_response();
    };

    let token = raw_id
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(|id| find_token_by_id(tokens, id));

    match token {
        Some(token) => (StatusCode::OK, Json(token)).into_response(),
        None => HandlerError::TokenNotFound.into_response(),
    }
}
