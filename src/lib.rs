//! xbps-prune - retention policy for the XBPS package cache
//!
//! Keeps the newest N versions of each cached package, never touching held
//! packages or their dependency closure, and removes orphaned signatures.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod oracle;
pub mod ui;

pub use error::{PruneError, PruneResult};
