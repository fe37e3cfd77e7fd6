// API version identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An API version as it appears in request paths (`api/v1/...`).
///
/// Supports simple numeric versions (1, 2) and dotted versions (2.1).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub const fn major_only(major: u32) -> Self {
        Self { major, minor: 0 }
    }

    /// Version 1.0
    pub const V1: Self = Self::new(1, 0);
    /// Version 2.0
    pub const V2: Self = Self::new(2, 0);

    /// Format as a path segment ("v1", "v2.1")
    pub fn as_path_prefix(&self) -> String {
        if self.minor == 0 {
            format!("v{}", self.major)
        } else {
            format!("v{}.{}", self.major, self.minor)
        }
    }

    /// Parse from a path segment ("v1", "V2.1")
    pub fn from_path_prefix(segment: &str) -> Option<Self> {
        let rest = segment.strip_prefix('v').or_else(|| segment.strip_prefix('V'))?;
        Self::from_str(rest).ok()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minor == 0 {
            write!(f, "{}", self.major)
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

/// Error parsing an API version string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("invalid version format")]
    InvalidFormat,
    #[error("empty version string")]
    Empty,
}

impl FromStr for ApiVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }
        let s = s.strip_prefix('v').or_else(|| s.strip_prefix('V')).unwrap_or(s);

        if let Some((major, minor)) = s.split_once('.') {
            let major: u32 = major.parse().map_err(|_| VersionParseError::InvalidFormat)?;
            let minor: u32 = minor.parse().map_err(|_| VersionParseError::InvalidFormat)?;
            Ok(Self::new(major, minor))
        } else {
            let major: u32 = s.parse().map_err(|_| VersionParseError::InvalidFormat)?;
            Ok(Self::major_only(major))
        }
    }
}
