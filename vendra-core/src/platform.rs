//! Platform Detection
//!
//! Resolves which client platform and API version an inbound unit of work
//! targets. Detection is a pure function of the request descriptor and static
//! configuration, re-run per request.
//!
//! Real traffic never falls back to a default platform: a request routed to
//! functionality designed for a different client surface is worse than a
//! rejected request. Console and background invocations have no request
//! context, so for those the first configured version and platform are used
//! deterministically.

use crate::error::Error;
use crate::http::{Invocation, RequestDescriptor};
use crate::version::ApiVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The client surface a request originates from.
///
/// Used purely as a routing key for selecting among otherwise-identical
/// service implementations; never persisted as request data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Web,
    Mobile,
}

impl Platform {
    /// The wire tag for this platform, as sent in the selector header
    pub const fn tag(&self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Mobile => "mobile",
        }
    }

    /// All known platforms
    pub const fn all() -> &'static [Platform] {
        &[Platform::Web, Platform::Mobile]
    }

    /// Parse a wire tag, case-insensitively
    pub fn from_tag(tag: &str) -> Option<Platform> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "web" => Some(Platform::Web),
            "mobile" => Some(Platform::Mobile),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The resolved (version, platform) pair that parameterizes service binding
/// for the rest of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedTarget {
    pub version: ApiVersion,
    pub platform: Platform,
}

/// Static detection configuration.
///
/// Order matters: the first configured version and platform are the
/// deterministic fallback for console invocations.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    versions: Vec<ApiVersion>,
    platforms: Vec<Platform>,
    header: String,
    path_prefix: String,
}

impl PlatformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configured API versions, in declaration order
    pub fn with_versions(mut self, versions: Vec<ApiVersion>) -> Self {
        self.versions = versions;
        self
    }

    /// Set the configured platforms, in declaration order
    pub fn with_platforms(mut self, platforms: Vec<Platform>) -> Self {
        self.platforms = platforms;
        self
    }

    /// Set the platform selector header name
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into().to_lowercase();
        self
    }

    pub fn versions(&self) -> &[ApiVersion] {
        &self.versions
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    fn valid_platform_tags(&self) -> String {
        self.platforms
            .iter()
            .map(Platform::tag)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            versions: vec![ApiVersion::V1],
            platforms: vec![Platform::Web, Platform::Mobile],
            header: "x-platform".to_string(),
            path_prefix: "api".to_string(),
        }
    }
}

/// Platform detector
pub struct PlatformDetector {
    config: PlatformConfig,
}

impl PlatformDetector {
    pub fn new(config: PlatformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Resolve the (version, platform) pair for an invocation.
    ///
    /// Console invocations resolve to the first configured version and
    /// platform. HTTP invocations must match `api/{version}/*` against a
    /// configured version and carry a recognized platform selector header;
    /// anything else fails fast.
    pub fn detect(&self, invocation: &Invocation) -> Result<ResolvedTarget, Error> {
        match invocation {
            Invocation::Console => self.console_fallback(),
            Invocation::Http(request) => self.detect_from_request(request),
        }
    }

    fn console_fallback(&self) -> Result<ResolvedTarget, Error> {
        let version = self
            .config
            .versions
            .first()
            .copied()
            .ok_or_else(|| Error::Internal("no API versions configured".to_string()))?;
        let platform = self
            .config
            .platforms
            .first()
            .copied()
            .ok_or_else(|| Error::Internal("no platforms configured".to_string()))?;

        debug!(%version, %platform, "Console invocation, using first configured target");
        Ok(ResolvedTarget { version, platform })
    }

    fn detect_from_request(&self, request: &RequestDescriptor) -> Result<ResolvedTarget, Error> {
        let version = self
            .extract_version(&request.path)
            .ok_or_else(|| Error::InvalidVersion(request.path.clone()))?;

        let raw = request
            .header(&self.config.header)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::MissingPlatform(self.config.header.clone()))?;

        let platform = Platform::from_tag(raw)
            .filter(|platform| self.config.platforms.contains(platform))
            .ok_or_else(|| Error::UnknownPlatform {
                value: raw.to_string(),
                expected: self.config.valid_platform_tags(),
            })?;

        debug!(%version, %platform, path = %request.path, "Resolved platform target");
        Ok(ResolvedTarget { version, platform })
    }

    /// Match the path against `api/{version}/*` for a configured version
    fn extract_version(&self, path: &str) -> Option<ApiVersion> {
        let mut segments = path.trim_start_matches('/').split('/');
        if segments.next()? != self.config.path_prefix {
            return None;
        }
        let version = ApiVersion::from_path_prefix(segments.next()?)?;
        self.config.versions.contains(&version).then_some(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> PlatformDetector {
        PlatformDetector::new(PlatformConfig::default())
    }

    fn request(path: &str) -> RequestDescriptor {
        RequestDescriptor::new("GET", path)
    }

    #[test]
    fn detects_version_and_platform() {
        let target = detector()
            .detect(&Invocation::Http(
                request("/api/v1/orders").with_header("X-Platform", "web"),
            ))
            .unwrap();
        assert_eq!(target.version, ApiVersion::V1);
        assert_eq!(target.platform, Platform::Web);
    }

    #[test]
    fn platform_tag_is_case_insensitive() {
        let target = detector()
            .detect(&Invocation::Http(
                request("/api/v1/orders").with_header("x-platform", "MOBILE"),
            ))
            .unwrap();
        assert_eq!(target.platform, Platform::Mobile);
    }

    #[test]
    fn unconfigured_version_is_fatal() {
        let result = detector().detect(&Invocation::Http(
            request("/api/v9/orders").with_header("x-platform", "web"),
        ));
        assert!(matches!(result, Err(Error::InvalidVersion(_))));
    }

    #[test]
    fn path_outside_api_prefix_is_fatal() {
        let result = detector().detect(&Invocation::Http(
            request("/admin/v1/orders").with_header("x-platform", "web"),
        ));
        assert!(matches!(result, Err(Error::InvalidVersion(_))));
    }

    #[test]
    fn missing_header_is_a_client_error() {
        let result = detector().detect(&Invocation::Http(request("/api/v1/orders")));
        assert!(matches!(result, Err(Error::MissingPlatform(_))));
    }

    #[test]
    fn empty_header_is_missing() {
        let result = detector().detect(&Invocation::Http(
            request("/api/v1/orders").with_header("x-platform", "  "),
        ));
        assert!(matches!(result, Err(Error::MissingPlatform(_))));
    }

    #[test]
    fn unknown_platform_enumerates_valid_values() {
        let result = detector().detect(&Invocation::Http(
            request("/api/v1/orders").with_header("x-platform", "desktop"),
        ));
        match result {
            Err(Error::UnknownPlatform { value, expected }) => {
                assert_eq!(value, "desktop");
                assert_eq!(expected, "web, mobile");
            }
            other => panic!("expected UnknownPlatform, got {other:?}"),
        }
    }

    #[test]
    fn console_fallback_is_deterministic() {
        let detector = PlatformDetector::new(
            PlatformConfig::new()
                .with_versions(vec![ApiVersion::V2, ApiVersion::V1])
                .with_platforms(vec![Platform::Mobile, Platform::Web]),
        );
        for _ in 0..10 {
            let target = detector.detect(&Invocation::Console).unwrap();
            assert_eq!(target.version, ApiVersion::V2);
            assert_eq!(target.platform, Platform::Mobile);
        }
    }

    #[test]
    fn detection_has_no_side_effects() {
        let detector = detector();
        let invocation =
            Invocation::Http(request("/api/v1/orders").with_header("x-platform", "web"));
        let first = detector.detect(&invocation).unwrap();
        let second = detector.detect(&invocation).unwrap();
        assert_eq!(first, second);
    }
}
