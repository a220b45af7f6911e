//! HTTP transport port
//!
//! The statement fetcher talks to the bank only through this trait, so the
//! pagination logic can be driven by a fake in tests while production uses
//! the mutual-TLS adapter.

use std::fmt;
use std::time::Duration;

use serde_json::Value as JsonValue;

use crate::domain::mask;
use crate::domain::result::Result;
use crate::domain::CertificateSet;

/// Headers whose values must never be logged in clear
pub const SENSITIVE_HEADERS: [&str; 3] = ["authorization", "gw-dev-app-key", "x-application-key"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// A fully-built request
#[derive(Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    /// Overrides the transport's default timeout when set
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Headers safe to write to a log
    pub fn redacted_headers(&self) -> Vec<(String, String)> {
        redact_headers(&self.headers)
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.redacted_headers())
            .field("has_body", &self.body.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Mask sensitive header values, keeping the rest as-is
pub fn redact_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let lower = name.to_ascii_lowercase();
            if SENSITIVE_HEADERS.contains(&lower.as_str()) {
                (name.clone(), mask(value))
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}

/// Sends requests and returns parsed JSON bodies
///
/// Implementations must:
/// - return an empty JSON object for a 2xx response with an empty body
/// - fail with `MalformedResponse` when a 2xx body is not JSON
/// - fail with `HttpStatus` on any non-2xx status, without retrying
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<JsonValue>;
}

/// Builds a transport bound to one connection's certificates
pub trait TransportFactory: Send + Sync {
    fn connect(&self, certificates: &CertificateSet) -> Result<Box<dyn HttpTransport>>;
}
