use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::{
    endpoints::{error_response, persist_after_mutation},
    registry::queries::{append_token, is_truthy, NewToken},
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
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            HandlerError::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            HandlerError::MissingFields => StatusCode::BAD_REQUEST,
            HandlerError::ServiceNotReady => StatusCode::SERVICE_UNAVAILABLE,
        };

        error_response(status, self.to_string())
    }
}

/// JSON payload expected by the endpoint. `address` is optional and defaults
/// to an empty string. The required fields are loosely typed so that a value
/// of the wrong type is reported like a missing one.
#[derive(Debug, Deserialize)]
pub struct CreateTokenRequest {
    name: Option<Value>,
    quantity: Option<Value>,
    stars: Option<Value>,
    address: Option<String>,
}

impl CreateTokenRequest {
    fn validate(self) -> Result<NewToken, HandlerError> {
        let name = self.name.filter(is_truthy);
        let quantity = self.quantity.filter(is_truthy);
        let stars = self
            .stars
            .as_ref()
            .and_then(Value::as_u64)
            .and_then(|stars| u32::try_from(stars).ok())
            .filter(|stars| *stars > 0);

        match (name, quantity, stars) {
            (Some(name), Some(quantity), Some(stars)) => Ok(NewToken {
                address: self.address.unwrap_or_default(),
                name,
                quantity,
                stars,
            }),
            _ => Err(HandlerError::MissingFields),
        }
    }
}

/// Axum handler: POST /tokens
pub async fn handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<CreateTokenRequest>, JsonRejection>,
) -> impl IntoResponse {
    let new = match body.map_err(HandlerError::from).and_then(|Json(input)| input.validate()) {
        Ok(new) => new,
        Err(err) => return err.into_response(),
    };

    let mut registry = state.registry.lock().await;
    let Some(tokens) = registry.as_mut() else {
        return HandlerError::ServiceNotReady.into_response();
    };

    let created = append_token(tokens, new).clone();
    info!(id = created.id, name = %created.name, "token created");

    persist_after_mutation(&state.config.store_path, tokens).await;

    (StatusCode::CREATED, Json(created)).into_response()
}
