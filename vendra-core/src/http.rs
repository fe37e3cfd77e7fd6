// Request descriptor handed in by the host server

use std::collections::HashMap;

/// A parsed view of an inbound request.
///
/// The platform core never touches sockets; the host server hands in the
/// already-parsed pieces the core needs: method, path and headers. Header
/// names are stored lowercased so lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
        }
    }

    /// Add a header (name lowercased on insert)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Get a header by name, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// The request's Host header, looked up verbatim for tenant resolution
    pub fn host(&self) -> Option<&str> {
        self.header("host")
    }
}

/// How a unit of work was started.
///
/// Background and administrative invocations carry no request context, so
/// platform detection treats them differently from real traffic.
#[derive(Debug, Clone)]
pub enum Invocation {
    /// An inbound HTTP request
    Http(RequestDescriptor),
    /// A console/background invocation with no request descriptor
    Console,
}

impl Invocation {
    pub fn is_console(&self) -> bool {
        matches!(self, Invocation::Console)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive() {
        let request = RequestDescriptor::new("GET", "/api/v1/orders")
            .with_header("X-Platform", "web")
            .with_header("Host", "store1.example.com");

        assert_eq!(request.header("x-platform"), Some("web"));
        assert_eq!(request.header("X-PLATFORM"), Some("web"));
        assert_eq!(request.host(), Some("store1.example.com"));
    }

    #[test]
    fn console_invocation() {
        assert!(Invocation::Console.is_console());
        let http = Invocation::Http(RequestDescriptor::new("GET", "/"));
        assert!(!http.is_console());
    }
}
