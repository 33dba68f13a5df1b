//! Cache inventory
//!
//! A read-only scan of the flat cache directory. Archives are recorded with
//! their package key, creation time and size; everything else is ignored.

use super::identity::{is_archive, signature_target, PackageFile, PackageKey};
use crate::error::{PruneError, PruneResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// One package archive found in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    /// File name relative to the cache directory
    pub filename: String,
    /// Package identity the archive is grouped under
    pub package: PackageKey,
    /// Creation time used to order versions
    pub created_at: DateTime<Utc>,
    /// Archive size in bytes
    pub size: u64,
}

/// Snapshot of the archives in a cache directory
#[derive(Debug, Clone)]
pub struct Inventory {
    dir: PathBuf,
    archives: Vec<ArchiveEntry>,
}

impl Inventory {
    /// Scan a cache directory
    pub fn scan(dir: &Path) -> PruneResult<Self> {
        let archives = list_archives(dir)?;
        debug!(
            "Inventory of {}: {} archive(s)",
            dir.display(),
            archives.len()
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            archives,
        })
    }

    /// Build an inventory from already-known entries
    pub fn from_entries(dir: impl Into<PathBuf>, mut archives: Vec<ArchiveEntry>) -> Self {
        archives.sort_by(|a, b| a.filename.cmp(&b.filename));
        Self {
            dir: dir.into(),
            archives,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Archives sorted by filename
    pub fn archives(&self) -> &[ArchiveEntry] {
        &self.archives
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Distinct package keys present in the cache
    pub fn package_keys(&self) -> BTreeSet<PackageKey> {
        self.archives.iter().map(|a| a.package.clone()).collect()
    }

    /// Archives grouped by package key, each group in filename order
    pub fn by_package(&self) -> BTreeMap<&PackageKey, Vec<&ArchiveEntry>> {
        let mut groups: BTreeMap<&PackageKey, Vec<&ArchiveEntry>> = BTreeMap::new();
        for archive in &self.archives {
            groups.entry(&archive.package).or_default().push(archive);
        }
        groups
    }
}

/// List every parsable archive in `dir`, sorted by filename
///
/// Archive names that do not follow `<name>-<version>_<revision>.<arch>.xbps`
/// are skipped with a warning; they can never become deletion candidates.
pub fn list_archives(dir: &Path) -> PruneResult<Vec<ArchiveEntry>> {
    let mut archives = Vec::new();

    for filename in list_file_names(dir)? {
        if !is_archive(&filename) {
            continue;
        }

        let package = match PackageFile::parse(&filename) {
            Ok(file) => file.pkgver.name,
            Err(e) => {
                warn!("Skipping {}: {}", filename, e);
                continue;
            }
        };

        let path = dir.join(&filename);
        let metadata = fs::metadata(&path)
            .map_err(|e| PruneError::io(format!("reading metadata of {}", path.display()), e))?;

        archives.push(ArchiveEntry {
            created_at: created_at(&metadata),
            size: metadata.len(),
            package,
            filename,
        });
    }

    Ok(archives)
}

/// Distinct package keys of the archives in `dir`
pub fn list_package_keys(dir: &Path) -> PruneResult<BTreeSet<PackageKey>> {
    Ok(list_archives(dir)?
        .into_iter()
        .map(|a| a.package)
        .collect())
}

/// List every signature file in `dir`, sorted by filename
pub fn list_signatures(dir: &Path) -> PruneResult<Vec<String>> {
    Ok(list_file_names(dir)?
        .into_iter()
        .filter(|name| signature_target(name).is_some())
        .collect())
}

/// Sorted names of the regular files directly inside `dir`
fn list_file_names(dir: &Path) -> PruneResult<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PruneError::CacheDirNotFound(dir.to_path_buf()),
        _ => PruneError::io(format!("reading cache directory {}", dir.display()), e),
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| PruneError::io(format!("reading cache directory {}", dir.display()), e))?;

        // Follows symlinks, so a linked archive counts as a file
        let path = entry.path();
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => continue,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Skipping dangling link {}", path.display());
                continue;
            }
            Err(e) => return Err(PruneError::io(format!("inspecting {}", path.display()), e)),
        }

        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!("Skipping non UTF-8 file name {:?}", raw),
        }
    }

    names.sort();
    Ok(names)
}

/// Inode change time on Unix, creation (or modification) time elsewhere
fn created_at(metadata: &fs::Metadata) -> DateTime<Utc> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let Some(ts) = DateTime::from_timestamp(metadata.ctime(), metadata.ctime_nsec() as u32)
        {
            return ts;
        }
    }

    let time = metadata
        .created()
        .or_else(|_| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    DateTime::<Utc>::from(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, contents: &[u8]) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn lists_only_archives() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "foo-1.0_1.x86_64.xbps", b"aaaa");
        touch(dir.path(), "foo-1.0_1.x86_64.xbps.sig", b"s");
        touch(dir.path(), "README", b"");
        fs::create_dir(dir.path().join("sub-1.0_1.x86_64.xbps")).unwrap();

        let archives = list_archives(dir.path()).unwrap();

        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].filename, "foo-1.0_1.x86_64.xbps");
        assert_eq!(archives[0].package.as_str(), "foo");
        assert_eq!(archives[0].size, 4);
    }

    #[test]
    fn archives_are_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "zlib-1.3_1.x86_64.xbps", b"");
        touch(dir.path(), "bash-5.2_1.x86_64.xbps", b"");
        touch(dir.path(), "bash-5.1_1.x86_64.xbps", b"");

        let names: Vec<_> = list_archives(dir.path())
            .unwrap()
            .into_iter()
            .map(|a| a.filename)
            .collect();

        assert_eq!(
            names,
            vec![
                "bash-5.1_1.x86_64.xbps",
                "bash-5.2_1.x86_64.xbps",
                "zlib-1.3_1.x86_64.xbps"
            ]
        );
    }

    #[test]
    fn malformed_archive_is_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "broken.xbps", b"");
        touch(dir.path(), "ok-1_1.noarch.xbps", b"");

        let archives = list_archives(dir.path()).unwrap();
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].package.as_str(), "ok");
    }

    #[test]
    fn package_keys_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "foo-1.0_1.x86_64.xbps", b"");
        touch(dir.path(), "foo-1.1_1.x86_64.xbps", b"");
        touch(dir.path(), "foo-bar-1.0_1.x86_64.xbps", b"");

        let keys: Vec<String> = list_package_keys(dir.path())
            .unwrap()
            .into_iter()
            .map(|k| k.to_string())
            .collect();

        assert_eq!(keys, vec!["foo", "foo-bar"]);
    }

    #[test]
    fn grouping_does_not_mix_prefixes() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "foo-1.0_1.x86_64.xbps", b"");
        touch(dir.path(), "foo-bar-1.0_1.x86_64.xbps", b"");
        touch(dir.path(), "foo-bar-1.1_1.x86_64.xbps", b"");

        let inventory = Inventory::scan(dir.path()).unwrap();
        let groups = inventory.by_package();

        assert_eq!(groups.len(), 2);
        let foo = PackageKey::from_pkgver("foo-1_1").unwrap();
        let foo_bar = PackageKey::from_pkgver("foo-bar-1_1").unwrap();
        assert_eq!(groups[&foo].len(), 1);
        assert_eq!(groups[&foo_bar].len(), 2);
    }

    #[test]
    fn lists_signatures() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a-1_1.noarch.xbps", b"");
        touch(dir.path(), "a-1_1.noarch.xbps.sig2", b"");
        touch(dir.path(), "b-1_1.noarch.xbps.sig", b"");

        let sigs = list_signatures(dir.path()).unwrap();
        assert_eq!(sigs, vec!["a-1_1.noarch.xbps.sig2", "b-1_1.noarch.xbps.sig"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let err = Inventory::scan(&missing).unwrap_err();
        assert!(matches!(err, PruneError::CacheDirNotFound(_)));
    }

    #[test]
    fn empty_directory() {
        let dir = TempDir::new().unwrap();
        let inventory = Inventory::scan(dir.path()).unwrap();
        assert!(inventory.is_empty());
        assert!(inventory.package_keys().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_archives_are_listed() {
        use std::os::unix::fs::symlink;

        let store = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        for i in 0..4 {
            let archive = format!("foo-1.{i}_1.x86_64.xbps");
            touch(store.path(), &archive, b"abcdef");
            symlink(store.path().join(&archive), dir.path().join(&archive)).unwrap();
            touch(dir.path(), &format!("{archive}.sig"), b"s");
        }
        symlink(dir.path().join("missing"), dir.path().join("bar-1.0_1.x86_64.xbps")).unwrap();

        let archives = list_archives(dir.path()).unwrap();

        assert_eq!(archives.len(), 4);
        assert!(archives.iter().all(|a| a.package.as_str() == "foo"));
        assert!(archives.iter().all(|a| a.size == 6));
    }
}
