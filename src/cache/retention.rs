//! Keep-last-N retention
//!
//! For every unprotected package, versions are ordered oldest first and all
//! but the newest `keep` become deletion candidates. Protected packages
//! (held, or depended on by something held) are never touched.

use super::identity::PackageKey;
use super::inventory::{ArchiveEntry, Inventory};
use crate::error::{PruneError, PruneResult};
use crate::oracle::{Protection, ProtectedSet};
use std::fmt;
use tracing::debug;

/// Smallest number of versions the policy will keep per package
pub const MIN_KEEP: usize = 2;

/// Number of newest versions to keep per package (always >= 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepPolicy(usize);

impl KeepPolicy {
    /// Validate a user supplied keep count
    ///
    /// Values below [`MIN_KEEP`] are refused rather than clamped.
    pub fn new(keep: i64) -> PruneResult<Self> {
        match usize::try_from(keep) {
            Ok(n) if n >= MIN_KEEP => Ok(Self(n)),
            _ => Err(PruneError::PolicyRefusal { keep }),
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// All versions of one package, oldest first
#[derive(Debug, Clone)]
pub struct RetentionGroup<'a> {
    pub package: &'a PackageKey,
    pub versions: Vec<&'a ArchiveEntry>,
}

impl<'a> RetentionGroup<'a> {
    /// Order versions by creation time, ties broken by filename
    pub fn new(package: &'a PackageKey, mut versions: Vec<&'a ArchiveEntry>) -> Self {
        versions.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Self { package, versions }
    }

    /// Split into (delete, keep); delete is empty unless there are more than `keep` versions
    pub fn split(&self, keep: KeepPolicy) -> (&[&'a ArchiveEntry], &[&'a ArchiveEntry]) {
        let excess = self.versions.len().saturating_sub(keep.get());
        self.versions.split_at(excess)
    }
}

/// Outcome for one unprotected package
#[derive(Debug, Clone)]
pub struct Decision<'a> {
    pub package: &'a PackageKey,
    /// Oldest versions beyond the keep count
    pub delete: Vec<&'a ArchiveEntry>,
    /// Newest `keep` versions
    pub keep: Vec<&'a ArchiveEntry>,
}

/// Result of evaluating a whole inventory
#[derive(Debug, Clone, Default)]
pub struct Evaluation<'a> {
    /// One decision per unprotected package, in package order
    pub decisions: Vec<Decision<'a>>,
    /// Packages skipped because they are protected
    pub protected: Vec<(&'a PackageKey, Protection)>,
}

impl<'a> Evaluation<'a> {
    /// Every deletion candidate, grouped by package in package order
    pub fn candidates(&self) -> impl Iterator<Item = &'a ArchiveEntry> + '_ {
        self.decisions.iter().flat_map(|d| d.delete.iter().copied())
    }

    /// Every retained version of an unprotected package
    pub fn kept(&self) -> impl Iterator<Item = &'a ArchiveEntry> + '_ {
        self.decisions.iter().flat_map(|d| d.keep.iter().copied())
    }

    /// Decisions that actually delete something
    pub fn pruned(&self) -> impl Iterator<Item = &Decision<'a>> {
        self.decisions.iter().filter(|d| !d.delete.is_empty())
    }

    pub fn candidate_count(&self) -> usize {
        self.decisions.iter().map(|d| d.delete.len()).sum()
    }
}

/// Decide which archives to delete
pub fn evaluate<'a>(
    inventory: &'a Inventory,
    protected: &ProtectedSet,
    keep: KeepPolicy,
) -> Evaluation<'a> {
    let mut evaluation = Evaluation::default();

    for (package, versions) in inventory.by_package() {
        if let Some(reason) = protected.reason(package) {
            debug!("Package {} is {}, skipping", package, reason);
            evaluation.protected.push((package, reason));
            continue;
        }

        let group = RetentionGroup::new(package, versions);
        let (delete, kept) = group.split(keep);

        if !delete.is_empty() {
            debug!(
                "Package {}: {} version(s), pruning {}",
                package,
                group.versions.len(),
                delete.len()
            );
        }

        evaluation.decisions.push(Decision {
            package,
            delete: delete.to_vec(),
            keep: kept.to_vec(),
        });
    }

    evaluation
}
