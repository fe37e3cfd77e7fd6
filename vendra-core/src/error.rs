// Error types for the Vendra platform core

use thiserror::Error;

/// Errors produced while resolving a request's platform target or binding
/// contracts to concrete implementations.
///
/// The taxonomy distinguishes configuration defects (wrong deployment, never
/// retried) from client input errors (correctable by the caller).
#[derive(Error, Debug)]
pub enum Error {
    /// The request path did not match `api/{version}/*` for any configured
    /// API version. A deployment defect, not a client condition.
    #[error("no configured API version matches path: {0}")]
    InvalidVersion(String),

    /// The platform selector header was absent or empty.
    #[error("missing platform header: {0}")]
    MissingPlatform(String),

    /// The platform selector header carried an unrecognized value.
    #[error("unknown platform '{value}', expected one of: {expected}")]
    UnknownPlatform { value: String, expected: String },

    /// No concrete implementation is registered for the contract on the
    /// resolved platform. A deployment defect.
    #[error("no implementation of '{contract}' registered for platform '{platform}'")]
    NoImplementationFound { contract: String, platform: String },

    /// Two concretes declared the same platform for one contract. Rejected at
    /// registration time so lookups never have to disambiguate.
    #[error("duplicate binding of '{contract}' for platform '{platform}'")]
    DuplicateBinding { contract: String, platform: String },

    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status code a host server should surface this error with.
    pub fn status_code(&self) -> u16 {
        match self {
            // Client input errors
            Error::MissingPlatform(_) => 400,
            Error::UnknownPlatform { .. } => 400,

            // Configuration errors surface as server failures
            Error::InvalidVersion(_) => 500,
            Error::NoImplementationFound { .. } => 500,
            Error::DuplicateBinding { .. } => 500,
            Error::ProviderNotFound(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_errors_are_client_errors() {
        assert!(Error::MissingPlatform("x-platform".into()).is_client_error());
        assert!(
            Error::UnknownPlatform {
                value: "tv".into(),
                expected: "web, mobile".into(),
            }
            .is_client_error()
        );
    }

    #[test]
    fn configuration_errors_are_server_errors() {
        assert!(Error::InvalidVersion("/api/v9/orders".into()).is_server_error());
        assert!(
            Error::NoImplementationFound {
                contract: "AuthService".into(),
                platform: "mobile".into(),
            }
            .is_server_error()
        );
    }

    #[test]
    fn unknown_platform_message_enumerates_valid_set() {
        let err = Error::UnknownPlatform {
            value: "desktop".into(),
            expected: "web, mobile".into(),
        };
        let message = err.to_string();
        assert!(message.contains("web, mobile"));
        assert!(message.contains("desktop"));
    }
}
