//! Background refresh of the registry from the hot-token feed.
//!
//! One cycle is fetch, then load, merge, persist and swap. The fetch runs
//! without the registry lock so a slow upstream never blocks the handlers;
//! the rest runs under it so the store is written by one party at a time.

use std::{path::Path, sync::Arc, time::Duration};

use interfaces_bytelabs_hot_tokens::index::{fetch_hot_tokens, FetchHotTokensError, HotToken};
use thiserror::Error;
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{error, info, warn};

use crate::{
    reconcile::{draft_records, reconcile},
    registry::models::TokenRecord,
    state::AppState,
    store::queries::{load_tokens, save_tokens, LoadTokensError},
};

#[derive(Debug, Error)]
pub enum PollCycleError {
    #[error("FetchHotTokens: {source}")]
    FetchHotTokens {
        #[from]
        source: FetchHotTokensError,
    },
}

/// What happened to the store during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// No store existed; it was created from the fresh batch.
    Bootstrapped,
    /// The merged batch replaced the previous document.
    Rewritten,
    /// The existing document could not be read and was left in place.
    LeftUntouched,
    /// Writing the document failed.
    WriteFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub store: StoreOutcome,
}

pub fn spawn(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(run(state))
}

/// Runs cycles forever. The first one starts immediately; a cycle that
/// overruns the period delays the next tick instead of overlapping it.
pub async fn run(state: Arc<AppState>) {
    let period: Duration = state.config.poll_interval;
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(?period, url = %state.config.source_url, "poller started");

    loop {
        ticker.tick().await;

        if let Err(err) = poll_cycle(&state).await {
            warn!(error = %err, "poll cycle aborted, keeping previous tokens");
        }
    }
}

pub async fn poll_cycle(state: &AppState) -> Result<CycleReport, PollCycleError> {
    let batch = fetch_hot_tokens(&state.client, &state.config.source_url).await?;

    Ok(refresh_registry(state, batch).await)
}

/// Merges `batch` with the store, persists the result and swaps it in.
///
/// The registry is replaced whatever happens to the store; only a failed
/// fetch leaves it alone.
pub async fn refresh_registry(state: &AppState, batch: Vec<HotToken>) -> CycleReport {
    let path = state.config.store_path.as_path();
    let drafts = draft_records(batch);
    let fetched = drafts.len();

    let mut registry = state.registry.lock().await;

    let (records, store) = match load_tokens(path).await {
        Ok(prior) => {
            let merged = reconcile(drafts, &prior);
            info!(
                fetched,
                carried = merged.carried,
                reset = merged.reset,
                stale = merged.stale,
                "reconciled tokens with store"
            );
            if merged.reset > 0 {
                warn!(reset = merged.reset, "stored nonzero stars were not restored");
            }
            let outcome = persist(path, &merged.records, StoreOutcome::Rewritten).await;
            (merged.records, outcome)
        }
        Err(LoadTokensError::NotFound { .. }) => {
            info!(fetched, path = %path.display(), "no token store yet, creating it");
            let outcome = persist(path, &drafts, StoreOutcome::Bootstrapped).await;
            (drafts, outcome)
        }
        Err(err) => {
            error!(error = %err, "token store unreadable, leaving it untouched");
            (drafts, StoreOutcome::LeftUntouched)
        }
    };

    *registry = Some(records);

    CycleReport { fetched, store }
}

async fn persist(path: &Path, records: &[TokenRecord], on_success: StoreOutcome) -> StoreOutcome {
    match save_tokens(path, records).await {
        Ok(()) => on_success,
        Err(err) => {
            error!(error = %err, "failed to persist tokens");
            StoreOutcome::WriteFailed
        }
    }
}
