use interfaces_bytelabs_hot_tokens::index::{build_client, BuildClientError};
use reqwest::Client;

use crate::{config::Config, registry::Registry};

/// Everything the poller and the handlers share.
pub struct AppState {
    pub config: Config,
    pub registry: Registry,
    pub client: Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, BuildClientError> {
        let client = build_client(config.fetch_timeout)?;

        Ok(Self {
            config,
            registry: Registry::new(),
            client,
        })
    }
}
