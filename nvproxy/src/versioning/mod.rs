//! Per-release table construction.
//!
//! Releases change their ioctl surface incrementally, so the registry holds
//! one complete base table followed by sparse [`VersionDiff`]s. The table for
//! a release is every diff up to and including it, applied in order.

mod registry;

use log::Level;
use std::sync::LazyLock;
use thiserror::Error;

use crate::table::{IoctlClass, IoctlTable, TableOverlay};
use crate::version::{DriverVersion, VersionError};

pub use registry::BASE_VERSION;

/// Changes introduced by one release.
#[derive(Debug, Clone)]
pub struct VersionDiff {
    pub version: DriverVersion,
    pub handlers: TableOverlay,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("{version} is unsupported; minimum supported version is {minimum}")]
    Unsupported { version: DriverVersion, minimum: DriverVersion },

    #[error("no version diffs to build from")]
    EmptySequence,
}

/// Violations of the sequence ordering and overlay invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("diff #{index} ({version}) does not follow {previous}")]
    NotIncreasing { index: usize, version: DriverVersion, previous: DriverVersion },

    #[error("diff {version} lists {class} key {key:#x} more than once")]
    DuplicateKey { version: DriverVersion, class: IoctlClass, key: u32 },
}

static VERSIONING_TABLE: LazyLock<Vec<VersionDiff>> = LazyLock::new(registry::diffs);

/// Every release with a diff, oldest first. The first entry is the minimum
/// supported release.
pub fn versioning_table() -> &'static [VersionDiff] {
    &VERSIONING_TABLE
}

pub fn supported_versions() -> Vec<DriverVersion> {
    versioning_table().iter().map(|d| d.version).collect()
}

/// Effective table for the release named by `version`.
pub fn build_ioctl_table(version: &str) -> Result<IoctlTable, BuildError> {
    build_ioctl_table_from(versioning_table(), version)
}

/// Same as [`build_ioctl_table`] over an arbitrary sequence. `diffs` is
/// assumed to be sorted; see [`check_versioning_table`].
pub fn build_ioctl_table_from(diffs: &[VersionDiff], version: &str) -> Result<IoctlTable, BuildError> {
    build_for_version(diffs, version.parse()?)
}

pub(crate) fn build_for_version(diffs: &[VersionDiff], version: DriverVersion) -> Result<IoctlTable, BuildError> {
    let minimum = diffs.first().ok_or(BuildError::EmptySequence)?.version;
    if !version.is_greater_than_or_equal(&minimum) {
        nvproxy_log!(Level::Error, "versioning", "Driver {} is older than {}", version, minimum);
        return Err(BuildError::Unsupported { version, minimum });
    }

    let mut table = IoctlTable::new();
    for diff in diffs {
        if diff.version.is_greater_than(&version) {
            break;
        }
        table.apply(&diff.handlers);
    }

    nvproxy_log!(
        Level::Info,
        "versioning",
        "Built ioctl table for {}: frontend={} uvm={} control={} alloc={} fingerprint={}",
        version,
        table.len(IoctlClass::Frontend),
        table.len(IoctlClass::Uvm),
        table.len(IoctlClass::ControlCommand),
        table.len(IoctlClass::AllocationClass),
        table.fingerprint()
    );
    Ok(table)
}

/// Versions must strictly increase (from 0.0.0) and no overlay may list a
/// key twice within one class.
pub fn check_versioning_table(diffs: &[VersionDiff]) -> Result<(), SequenceError> {
    let mut previous = DriverVersion::default();
    for (index, diff) in diffs.iter().enumerate() {
        if !diff.version.is_greater_than(&previous) {
            return Err(SequenceError::NotIncreasing { index, version: diff.version, previous });
        }
        if let Some((class, key)) = diff.handlers.duplicate_key() {
            return Err(SequenceError::DuplicateKey { version: diff.version, class, key });
        }
        previous = diff.version;
    }
    Ok(())
}
