// src/lib.rs
// ────────────────────────────────────────────────────────────────────────────
// Public library entry point.  Re-export everything for both `main.rs` and
// integration tests.

#[macro_use]
pub mod macros;

pub mod config;
pub mod dispatch;
pub mod table;
pub mod version;
pub mod versioning;

pub use dispatch::{HostDriver, IoctlError, IoctlResult, NvProxy};
pub use table::{IoctlClass, IoctlTable, TableOverlay};
pub use version::{DriverVersion, VersionError};
pub use versioning::{build_ioctl_table, BuildError, VersionDiff};
