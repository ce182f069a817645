use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// One entry of the feed. Only `address` is interpreted; every other key is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotToken {
    #[serde(default)]
    pub address: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum BuildClientError {
    #[error("BuildClient: {source}")]
    BuildClient { source: reqwest::Error },
}

pub fn build_client(timeout: Duration) -> Result<Client, BuildClientError> {
    Client::builder()
        .timeout(timeout)
        .user_agent("rust-client")
        .build()
        .map_err(|source| BuildClientError::BuildClient { source })
}

pub async fn fetch_hot_tokens(
    client: &Client,
    url: &str,
) -> Result<Vec<HotToken>, FetchHotTokensError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|source| FetchHotTokensError::RequestSend { source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchHotTokensError::UnexpectedStatus { status });
    }

    let body = response
        .text()
        .await
        .map_err(|source| FetchHotTokensError::ResponseRead { source })?;

    let tokens: Vec<HotToken> = serde_json::from_str(&body)?;
    debug!(count = tokens.len(), url, "fetched hot tokens");

    Ok(tokens)
}

#[derive(Debug, Error)]
pub enum FetchHotTokensError {
    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("UnexpectedStatus: {status}")]
    UnexpectedStatus { status: StatusCode },

    #[error("ResponseRead: {source}")]
    ResponseRead { source: reqwest::Error },

    #[error("DeserializeResponseBody: {source}")]
    DeserializeResponseBody {
        #[from]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::get, Router};
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> anyhow::Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(format!("http://{addr}/2hot"))
    }

    #[tokio::test]
    async fn passes_unknown_fields_through() -> anyhow::Result<()> {
        let app = Router::new().route(
            "/2hot",
            get(|| async {
                r#"[{"address":"A1","total":12,"symbol":"HOT"},{"total":3}]"#
            }),
        );
        let url = serve(app).await?;
        let client = build_client(Duration::from_secs(2))?;

        let tokens = fetch_hot_tokens(&client, &url).await?;

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].address, "A1");
        assert_eq!(tokens[0].fields["total"], 12);
        assert_eq!(tokens[0].fields["symbol"], "HOT");
        assert_eq!(tokens[1].address, "");
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() -> anyhow::Result<()> {
        let app = Router::new().route(
            "/2hot",
            get(|| async { (AxumStatus::BAD_GATEWAY, "upstream down") }),
        );
        let url = serve(app).await?;
        let client = build_client(Duration::from_secs(2))?;

        let err = fetch_hot_tokens(&client, &url).await.unwrap_err();

        assert!(matches!(
            err,
            FetchHotTokensError::UnexpectedStatus { status } if status == StatusCode::BAD_GATEWAY
        ));
        Ok(())
    }

    #[tokio::test]
    async fn non_array_body_is_an_error() -> anyhow::Result<()> {
        let app = Router::new().route("/2hot", get(|| async { r#"{"tokens":[]}"# }));
        let url = serve(app).await?;
        let client = build_client(Duration::from_secs(2))?;

        let err = fetch_hot_tokens(&client, &url).await.unwrap_err();

        assert!(matches!(
            err,
            FetchHotTokensError::DeserializeResponseBody { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn slow_upstream_hits_the_timeout() -> anyhow::Result<()> {
        let app = Router::new().route(
            "/2hot",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "[]"
            }),
        );
        let url = serve(app).await?;
        let client = build_client(Duration::from_millis(100))?;

        let err = fetch_hot_tokens(&client, &url).await.unwrap_err();

        assert!(matches!(err, FetchHotTokensError::RequestSend { source } if source.is_timeout()));
        Ok(())
    }
}
