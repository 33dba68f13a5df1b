//! Error types for xbps-prune
//!
//! All modules use `PruneResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for xbps-prune operations
pub type PruneResult<T> = Result<T, PruneError>;

/// All errors that can occur while pruning a cache
#[derive(Error, Debug)]
pub enum PruneError {
    // Policy
    #[error("refusing to prune that much (keep = {keep}, minimum is 2)")]
    PolicyRefusal { keep: i64 },

    // Identity errors
    #[error("Invalid package identifier '{input}': {reason}")]
    InvalidPkgver { input: String, reason: &'static str },

    // Cache errors
    #[error("Cache directory not found: {0}")]
    CacheDirNotFound(PathBuf),

    #[error("Archive {archive} has no signature file in {dir}")]
    MissingSignature { archive: String, dir: PathBuf },

    // Query errors
    #[error("Package query tool unavailable: {command}")]
    QueryUnavailable {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Package query failed: {command}, exit code: {code}, stderr: {stderr}")]
    QueryFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Package query returned malformed output: {command}: {line:?}: {reason}")]
    QueryMalformed {
        command: String,
        line: String,
        reason: String,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl PruneError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid identifier error
    pub fn invalid_pkgver(input: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPkgver {
            input: input.into(),
            reason,
        }
    }

    /// A refusal is reported to the user but is not a failed run
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::PolicyRefusal { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheDirNotFound(_) => Some("Pass the cache location with -c /path/to/cache"),
            Self::QueryUnavailable { .. } => {
                Some("Install xbps or set query.command in the config file")
            }
            Self::QueryFailed { .. } => {
                Some("Nothing was deleted; held packages could not be determined")
            }
            Self::MissingSignature { .. } => {
                Some("Re-download the package or remove the archive by hand")
            }
            _ => None,
        }
    }
}
