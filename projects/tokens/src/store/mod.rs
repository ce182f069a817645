//! XML document holding the last known token list.

pub mod models;
pub mod queries;
