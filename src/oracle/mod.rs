//! Protection oracle
//!
//! Asks the package manager which packages are held and what they depend on.
//! Everything in that closure is protected from pruning.
//!
//! A failing query aborts the run. Treating a failure as "nothing is held"
//! would leave the protected set empty and expose pinned packages to deletion.

mod xbps;

pub use xbps::XbpsQuery;

use crate::cache::PackageKey;
use crate::error::{PruneError, PruneResult};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Source of held packages and dependency trees
#[async_trait]
pub trait PackageOracle: Send + Sync {
    /// Pkgvers of all held packages, one per entry
    async fn held_packages(&self) -> PruneResult<Vec<String>>;

    /// Pkgvers of the full transitive dependency tree of `package`, excluding itself
    async fn dependency_tree(&self, package: &PackageKey) -> PruneResult<Vec<String>>;

    /// Human-readable description of the query, for error messages
    fn describe(&self, query: &str) -> String;
}

/// Why a package is protected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    Held,
    Dependency,
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Held => write!(f, "held"),
            Self::Dependency => write!(f, "a dependency of a held package"),
        }
    }
}

/// Held packages plus their dependency closure
#[derive(Debug, Clone, Default)]
pub struct ProtectedSet {
    held: BTreeSet<PackageKey>,
    dependencies: BTreeSet<PackageKey>,
}

impl ProtectedSet {
    pub fn new(held: BTreeSet<PackageKey>, dependencies: BTreeSet<PackageKey>) -> Self {
        Self { held, dependencies }
    }

    /// Query the oracle for held packages and their dependency closure
    pub async fn resolve(oracle: &dyn PackageOracle, parallelism: usize) -> PruneResult<Self> {
        let held = held_package_keys(oracle).await?;
        let dependencies = dependency_closure_keys(oracle, &held, parallelism).await?;
        debug!(
            "Protected: {} held, {} dependencies",
            held.len(),
            dependencies.len()
        );
        Ok(Self { held, dependencies })
    }

    pub fn contains(&self, key: &PackageKey) -> bool {
        self.reason(key).is_some()
    }

    /// Why `key` is protected, held taking precedence
    pub fn reason(&self, key: &PackageKey) -> Option<Protection> {
        if self.held.contains(key) {
            Some(Protection::Held)
        } else if self.dependencies.contains(key) {
            Some(Protection::Dependency)
        } else {
            None
        }
    }

    pub fn held(&self) -> &BTreeSet<PackageKey> {
        &self.held
    }

    pub fn dependencies(&self) -> &BTreeSet<PackageKey> {
        &self.dependencies
    }

    pub fn len(&self) -> usize {
        self.held.union(&self.dependencies).count()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty() && self.dependencies.is_empty()
    }
}

/// Package keys of all held packages
pub async fn held_package_keys(oracle: &dyn PackageOracle) -> PruneResult<BTreeSet<PackageKey>> {
    let lines = oracle.held_packages().await?;
    reduce_to_keys(&oracle.describe("held packages"), &lines)
}

/// Package keys of the dependency closure of every held package
///
/// Queries are independent, so up to `parallelism` run at once. The merged
/// result does not depend on completion order.
pub async fn dependency_closure_keys(
    oracle: &dyn PackageOracle,
    held: &BTreeSet<PackageKey>,
    parallelism: usize,
) -> PruneResult<BTreeSet<PackageKey>> {
    let trees: Vec<BTreeSet<PackageKey>> = stream::iter(held.iter())
        .map(|package| async move {
            let lines = oracle.dependency_tree(package).await?;
            reduce_to_keys(&oracle.describe(&format!("dependencies of {package}")), &lines)
        })
        .buffer_unordered(parallelism.max(1))
        .try_collect()
        .await?;

    Ok(trees.into_iter().flatten().collect())
}

/// Reduce pkgver lines to package keys; any malformed line fails the query
fn reduce_to_keys(query: &str, lines: &[String]) -> PruneResult<BTreeSet<PackageKey>> {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| {
            PackageKey::from_pkgver(line).map_err(|e| PruneError::QueryMalformed {
                command: query.to_string(),
                line: line.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
