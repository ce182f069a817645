//! Client for the byte-labs "2hot" token feed.

pub mod index;
