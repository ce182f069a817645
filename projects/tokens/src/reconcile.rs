//! Merge of a freshly fetched batch with the stars recorded in the store.
//!
//! Records are matched by positional `id`. A prior record only carries
//! forward when its stored `stars` is exactly 0. Nonzero stored counts are
//! *not* restored, so every poll resets the visible stars to 0.
// TODO: restore nonzero stars once product confirms that was the intent;
// matching would then need `address` instead of the positional id.

use interfaces_bytelabs_hot_tokens::index::HotToken;
use serde_json::Value;

use crate::registry::models::TokenRecord;

/// Turns the fetched batch into records numbered from 1 with no stars.
pub fn draft_records(batch: Vec<HotToken>) -> Vec<TokenRecord> {
    batch
        .into_iter()
        .zip(1u32..)
        .map(|(token, id)| draft_record(token, id))
        .collect()
}

fn draft_record(token: HotToken, id: u32) -> TokenRecord {
    let HotToken {
        address,
        fields: mut extra,
    } = token;

    // owned by the registry, never taken from upstream
    extra.remove("id");
    extra.remove("stars");

    let name = extra.remove("name").unwrap_or(Value::Null);
    // the feed calls it `total`; it is still served under its own key
    let quantity = extra
        .remove("quantity")
        .or_else(|| extra.get("total").cloned())
        .unwrap_or(Value::Null);

    TokenRecord {
        id,
        address,
        name,
        quantity,
        stars: 0,
        extra,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub records: Vec<TokenRecord>,
    /// Prior zero-star records that matched a draft id.
    pub carried: usize,
    /// Prior records whose nonzero stars were dropped.
    pub reset: usize,
    /// Prior ids beyond the new batch.
    pub stale: usize,
}

pub fn reconcile(mut drafts: Vec<TokenRecord>, prior: &[TokenRecord]) -> Reconciliation {
    let mut carried = 0;
    let mut reset = 0;
    let mut stale = 0;

    for stored in prior {
        let Some(draft) = drafts.iter_mut().find(|draft| draft.id == stored.id) else {
            stale += 1;
            continue;
        };

        if stored.stars == 0 {
            draft.stars = stored.stars;
            carried += 1;
        } else {
            reset += 1;
        }
    }

    Reconciliation {
        records: drafts,
        carried,
        reset,
        stale,
    }
}
