//! Package cache retention
//!
//! The cache is a flat directory of `<pkgver>.<arch>.xbps` archives, each with
//! a detached signature. Pruning runs in one forward pass:
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Parse | `identity` | `PackageKey` per filename / pkgver |
//! | Scan | `inventory` | `ArchiveEntry` list |
//! | Decide | `retention` | deletion candidates per package |
//! | Act | `executor` | `Report`, orphan signature sweep |
//!
//! No state is kept between runs; everything is derived from the directory.

pub mod executor;
pub mod identity;
pub mod inventory;
pub mod retention;

pub use executor::{Executor, Mode, Report};
pub use identity::{PackageFile, PackageKey, Pkgver};
pub use inventory::{list_archives, list_package_keys, list_signatures, ArchiveEntry, Inventory};
pub use retention::{evaluate, Decision, Evaluation, KeepPolicy, RetentionGroup};
