//! The in-memory token list shared by the poller and the handlers.
//!
//! `None` until the first poll cycle completes. Every access that touches the
//! store file also holds this lock, so the file and the list never diverge
//! because of interleaved writers.

pub mod models;
pub mod queries;

use tokio::sync::{Mutex, MutexGuard};

use models::TokenRecord;

#[derive(Debug, Default)]
pub struct Registry {
    tokens: Mutex<Option<Vec<TokenRecord>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, Option<Vec<TokenRecord>>> {
        self.tokens.lock().await
    }

    pub async fn snapshot(&self) -> Option<Vec<TokenRecord>> {
        self.tokens.lock().await.clone()
    }
}
