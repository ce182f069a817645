use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    endpoints::{error_response, persist_after_mutation},
    registry::queries::{cast_vote, CastVoteError},
    state::AppState,
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{}", .source.body_text())]
    MalformedBody {
        #[from]
        source: JsonRejection,
    },
    #[error("Missing required fields")]
    MissingFields,
    #[error("Tokens are not loaded yet")]
    ServiceNotReady,
    #[error("Token not found")]
    TokenNotFound {
        #[source]
        source: CastVoteError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            HandlerError::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            HandlerError::MissingFields => StatusCode::BAD_REQUEST,
            HandlerError::ServiceNotReady => StatusCode::SERVICE_UNAVAILABLE,
            HandlerError::TokenNotFound { ref source } => {
                debug!(reason = %source, "vote rejected");
                StatusCode::NOT_FOUND
            }
        };

        error_response(status, self.to_string())
    }
}

/// JSON payload expected by the endpoint.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    id: Option<u32>,
    address: Option<String>,
}

/// Axum handler: POST /tokens/vote
///
/// Stars the token holding `address`; `id` only has to exist. See
/// [`cast_vote`] for the exact matching rule.
pub async fn handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(input) = match body {
        Ok(body) => body,
        Err(source) => return HandlerError::MalformedBody { source }.into_response(),
    };

    let (id, address) = match (input.id, input.address) {
        (Some(id), Some(address)) if id != 0 && !address.is_empty() => (id, address),
        _ => return HandlerError::MissingFields.into_response(),
    };

    let mut registry = state.registry.lock().await;
    let Some(tokens) = registry.as_mut() else {
        return HandlerError::ServiceNotReady.into_response();
    };

    let voted = match cast_vote(tokens, id, &address) {
        Ok(token) => token.clone(),
        Err(source) => return HandlerError::TokenNotFound { source }.into_response(),
    };
    info!(id, address = %address, stars = voted.stars, "vote recorded");

    persist_after_mutation(&state.config.store_path, tokens).await;

    (StatusCode::OK, Json(voted)).into_response()
}
