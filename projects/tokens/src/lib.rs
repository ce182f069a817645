//! Hot-token voting service
//!
//! - Polls the byte-labs feed on a timer, see `poller`
//! - Keeps the current tokens in memory (`registry`) and their stars in an
//!   XML file (`store`)
//! - REST API endpoints in `endpoints/`

pub mod config;
pub mod endpoints;
pub mod poller;
pub mod reconcile;
pub mod registry;
pub mod state;
pub mod store;
