//! CLI command implementations

pub mod config;
pub mod prune;

pub use config::execute as config;
pub use prune::{execute as prune, PruneOptions};
