//! Driver release identifiers.
//!
//! A release is `MAJOR.MINOR.PATCH`, e.g. `535.43.02`. Ordering is
//! lexicographic over the three components.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// A driver release, totally ordered by (major, minor, patch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DriverVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Reasons a version string is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid format of version string {text:?}")]
    Format { text: String },

    #[error("invalid format for major version {text:?}: {source}")]
    Major { text: String, #[source] source: ParseIntError },

    #[error("invalid format for minor version {text:?}: {source}")]
    Minor { text: String, #[source] source: ParseIntError },

    #[error("invalid format for patch version {text:?}: {source}")]
    Patch { text: String, #[source] source: ParseIntError },
}

impl DriverVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Strictly newer than `other`.
    pub fn is_greater_than(&self, other: &DriverVersion) -> bool {
        self > other
    }

    pub fn is_greater_than_or_equal(&self, other: &DriverVersion) -> bool {
        self >= other
    }
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for DriverVersion {
    type Err = VersionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = text.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(VersionError::Format { text: text.into() });
        };
        let major = major
            .parse()
            .map_err(|source| VersionError::Major { text: text.into(), source })?;
        let minor = minor
            .parse()
            .map_err(|source| VersionError::Minor { text: text.into(), source })?;
        let patch = patch
            .parse()
            .map_err(|source| VersionError::Patch { text: text.into(), source })?;
        Ok(Self { major, minor, patch })
    }
}

impl TryFrom<String> for DriverVersion {
    type Error = VersionError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<DriverVersion> for String {
    fn from(v: DriverVersion) -> Self {
        v.to_string()
    }
}
