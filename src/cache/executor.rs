//! Deletion of retention candidates
//!
//! Every candidate is measured before anything is removed, so an archive
//! without a signature aborts the run with the cache untouched. In apply mode
//! candidates are deleted (archive first, then its signatures) and the
//! directory is swept for signatures whose archive no longer exists.

use super::identity::{signature_names, signature_target};
use super::inventory::{list_signatures, ArchiveEntry};
use crate::error::{PruneError, PruneResult};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

/// Whether the executor touches the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    DryRun,
    Apply,
}

impl Mode {
    pub fn from_apply(apply: bool) -> Self {
        if apply {
            Self::Apply
        } else {
            Self::DryRun
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DryRun => write!(f, "dry run"),
            Self::Apply => write!(f, "apply"),
        }
    }
}

/// Outcome of an executor run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub mode: Mode,
    /// Candidate archives, in the order they were processed
    pub files: Vec<String>,
    /// Archive plus signature bytes of the candidates (freed in apply mode)
    pub bytes: u64,
    /// Orphan signatures deleted by the sweep (always 0 in dry run)
    pub orphan_signatures_removed: usize,
    /// Orphan signatures that already exist and would be swept (dry run only)
    pub orphans_pending: Vec<String>,
}

/// A candidate with its files resolved and measured
#[derive(Debug, Clone)]
struct Measured {
    archive: String,
    signatures: Vec<String>,
    bytes: u64,
}

/// Deletes candidates from one cache directory
#[derive(Debug, Clone)]
pub struct Executor {
    dir: PathBuf,
}

impl Executor {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Account for (and in apply mode, delete) the given candidates
    ///
    /// `on_file` is called for each candidate before it is deleted.
    pub fn execute<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a ArchiveEntry>,
        mode: Mode,
        mut on_file: impl FnMut(&str),
    ) -> PruneResult<Report> {
        let measured = candidates
            .into_iter()
            .map(|c| self.measure(c))
            .collect::<PruneResult<Vec<_>>>()?;

        let mut report = Report {
            mode,
            files: Vec::with_capacity(measured.len()),
            bytes: 0,
            orphan_signatures_removed: 0,
            orphans_pending: Vec::new(),
        };

        for candidate in &measured {
            on_file(candidate.archive.as_str());
            if mode == Mode::Apply {
                self.delete(candidate)?;
            }
            report.bytes += candidate.bytes;
            report.files.push(candidate.archive.clone());
        }

        match mode {
            Mode::Apply => report.orphan_signatures_removed = self.sweep_orphans()?,
            Mode::DryRun => report.orphans_pending = self.find_orphans()?,
        }

        Ok(report)
    }

    /// Signatures whose archive does not exist
    pub fn find_orphans(&self) -> PruneResult<Vec<String>> {
        Ok(list_signatures(&self.dir)?
            .into_iter()
            .filter(|sig| {
                signature_target(sig).is_some_and(|archive| !self.dir.join(archive).is_file())
            })
            .collect())
    }

    /// Delete every orphan signature, returning how many were removed
    pub fn sweep_orphans(&self) -> PruneResult<usize> {
        let orphans = self.find_orphans()?;
        for sig in &orphans {
            debug!("Removing orphan signature {}", sig);
            self.remove(sig)?;
        }
        Ok(orphans.len())
    }

    fn measure(&self, archive: &ArchiveEntry) -> PruneResult<Measured> {
        let mut bytes = self.size_of(&archive.filename)?.ok_or_else(|| {
            PruneError::io(
                format!("measuring {}", self.dir.join(&archive.filename).display()),
                io::Error::from(io::ErrorKind::NotFound),
            )
        })?;

        let mut signatures = Vec::new();
        for sig in signature_names(&archive.filename) {
            if let Some(size) = self.size_of(&sig)? {
                bytes += size;
                signatures.push(sig);
            }
        }

        if signatures.is_empty() {
            return Err(PruneError::MissingSignature {
                archive: archive.filename.clone(),
                dir: self.dir.clone(),
            });
        }

        Ok(Measured {
            archive: archive.filename.clone(),
            signatures,
            bytes,
        })
    }

    fn delete(&self, candidate: &Measured) -> PruneResult<()> {
        info!("Deleting {}", candidate.archive);
        self.remove(&candidate.archive)?;
        for sig in &candidate.signatures {
            self.remove(sig)?;
        }
        Ok(())
    }

    /// Size of a file in the cache, `None` if it does not exist
    fn size_of(&self, name: &str) -> PruneResult<Option<u64>> {
        let path = self.dir.join(name);
        match fs::metadata(&path) {
            Ok(m) if m.is_file() => Ok(Some(m.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PruneError::io(format!("measuring {}", path.display()), e)),
        }
    }

    fn remove(&self, name: &str) -> PruneResult<()> {
        let path = self.dir.join(name);
        fs::remove_file(&path).map_err(|e| PruneError::io(format!("removing {}", path.display()), e))
    }
}
