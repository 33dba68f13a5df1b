//! Package identity parsing
//!
//! XBPS names every binary package `<name>-<version>_<revision>` (a "pkgver")
//! and stores it in the cache as `<pkgver>.<arch>.xbps`, next to a detached
//! `<archive>.sig` or `<archive>.sig2` signature.
//!
//! The name is everything before the rightmost `-` of the pkgver, so names may
//! contain `-` themselves (`python3-foo-1.0_1` is `python3-foo`). Versions never
//! contain `-`. The arch is stripped first so `x86_64-musl` cannot be mistaken
//! for a version separator.

use crate::error::{PruneError, PruneResult};
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

/// Suffix of package archives in the cache
pub const ARCHIVE_SUFFIX: &str = ".xbps";

/// Suffixes of detached signatures, in the order xbps introduced them
pub const SIGNATURE_SUFFIXES: [&str; 2] = [".sig", ".sig2"];

/// Name-only identity used to group versions of the same package
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PackageKey(String);

impl PackageKey {
    /// Derive the key from a pkgver string such as `glibc-2.39_1`
    pub fn from_pkgver(pkgver: &str) -> PruneResult<Self> {
        Pkgver::parse(pkgver).map(|p| p.name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PackageKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A parsed `<name>-<version>_<revision>` identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkgver {
    pub name: PackageKey,
    pub version: String,
    pub revision: String,
}

impl Pkgver {
    /// Parse a pkgver, rejecting anything without a `-<version>_<revision>` tail
    pub fn parse(input: &str) -> PruneResult<Self> {
        let input = input.trim();
        let (name, tail) = input
            .rsplit_once('-')
            .ok_or_else(|| PruneError::invalid_pkgver(input, "missing '-' before version"))?;

        if name.is_empty() {
            return Err(PruneError::invalid_pkgver(input, "empty package name"));
        }

        let (version, revision) = tail
            .rsplit_once('_')
            .ok_or_else(|| PruneError::invalid_pkgver(input, "missing '_' before revision"))?;

        if version.is_empty() {
            return Err(PruneError::invalid_pkgver(input, "empty version"));
        }
        if revision.is_empty() || !revision.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PruneError::invalid_pkgver(input, "revision is not a number"));
        }

        Ok(Self {
            name: PackageKey(name.to_string()),
            version: version.to_string(),
            revision: revision.to_string(),
        })
    }
}

impl fmt::Display for Pkgver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}_{}", self.name, self.version, self.revision)
    }
}

/// A parsed cache archive filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub pkgver: Pkgver,
    pub arch: String,
}

impl PackageFile {
    /// Parse `<pkgver>.<arch>.xbps`
    pub fn parse(filename: &str) -> PruneResult<Self> {
        let stem = filename
            .strip_suffix(ARCHIVE_SUFFIX)
            .ok_or_else(|| PruneError::invalid_pkgver(filename, "not a .xbps archive"))?;

        let (pkgver, arch) = stem
            .rsplit_once('.')
            .ok_or_else(|| PruneError::invalid_pkgver(filename, "missing architecture"))?;

        if arch.is_empty() {
            return Err(PruneError::invalid_pkgver(filename, "missing architecture"));
        }

        Ok(Self {
            pkgver: Pkgver::parse(pkgver)?,
            arch: arch.to_string(),
        })
    }

    pub fn key(&self) -> &PackageKey {
        &self.pkgver.name
    }
}

/// Whether a filename looks like a package archive
pub fn is_archive(filename: &str) -> bool {
    filename.ends_with(ARCHIVE_SUFFIX)
}

/// The file a signature belongs to, or `None` if this is not a signature
pub fn signature_target(filename: &str) -> Option<&str> {
    SIGNATURE_SUFFIXES
        .iter()
        .find_map(|suffix| filename.strip_suffix(suffix))
        .filter(|target| !target.is_empty())
}

/// All signature filenames that may accompany an archive
pub fn signature_names(archive: &str) -> impl Iterator<Item = String> + '_ {
    SIGNATURE_SUFFIXES
        .iter()
        .map(move |suffix| format!("{archive}{suffix}"))
}
