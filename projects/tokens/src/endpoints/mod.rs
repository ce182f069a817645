pub mod tokens;

use std::{path::Path, sync::Arc};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use tracing::error;

use crate::{registry::models::TokenRecord, state::AppState, store::queries::save_tokens};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/tokens",
            get(tokens::list::index::handler).post(tokens::create::index::handler),
        )
        .route("/tokens/vote", post(tokens::vote::index::handler))
        .route("/tokens/{id}", get(tokens::read::index::handler))
        .layer(Extension(state))
}

/// `{"error": message}` with `status`.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Persists after a request mutated the registry. The in-memory change stands
/// even when the write fails; the next successful write catches the file up.
pub async fn persist_after_mutation(path: &Path, tokens: &[TokenRecord]) {
    if let Err(err) = save_tokens(path, tokens).await {
        error!(error = %err, path = %path.display(), "failed to persist tokens after request");
    }
}
