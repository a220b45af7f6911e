//! Mutual-TLS HTTP transport
//!
//! Blocking reqwest client pinned to a connection's CA bundle and presenting
//! its client certificate. rustls only offers AEAD cipher suites, so no weak
//! cipher can be negotiated.

use std::fs;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::tls::Version;
use reqwest::{Certificate, Identity};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::CertificateSet;
use crate::ports::{HttpMethod, HttpRequest, HttpTransport, TransportFactory};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport bound to one certificate set
pub struct MtlsTransport {
    client: Client,
    timeout: Duration,
}

impl MtlsTransport {
    /// Build a client trusting only the set's CA bundle
    pub fn new(certificates: &CertificateSet, timeout: Duration) -> Result<Self> {
        let ca_pem = read_material(&certificates.ca_cert_path, "CA bundle")?;
        let cert_pem = read_material(&certificates.client_cert_path, "client certificate")?;
        let key_pem = read_material(&certificates.private_key_path, "private key")?;

        let roots = Certificate::from_pem_bundle(&ca_pem)
            .map_err(|e| Error::Config(format!("Invalid CA bundle: {}", e)))?;
        if roots.is_empty() {
            return Err(Error::Config("CA bundle contains no certificates".to_string()));
        }

        let mut identity_pem = cert_pem;
        if !identity_pem.ends_with(b"\n") {
            identity_pem.push(b'\n');
        }
        identity_pem.extend_from_slice(&key_pem);
        let identity = Identity::from_pem(&identity_pem)
            .map_err(|e| Error::Config(format!("Invalid client certificate or key: {}", e)))?;

        let mut builder = Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .min_tls_version(Version::TLS_1_2)
            .https_only(true)
            .identity(identity)
            .timeout(timeout)
            .connect_timeout(timeout);
        for root in roots {
            builder = builder.add_root_certificate(root);
        }

        let client = builder
            .build()
            .map_err(|e| Error::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::transport(format!(
                "Connection timed out after {} seconds",
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            Error::transport(format!("Unable to connect to Banco do Brasil API: {}", error))
        } else {
            Error::transport(format!("Banco do Brasil request failed: {}", error))
        }
    }
}

impl HttpTransport for MtlsTransport {
    fn send(&self, request: &HttpRequest) -> Result<JsonValue> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(
            method = %request.method,
            url = %request.url,
            headers = ?request.redacted_headers(),
            "Sending request"
        );

        let response = builder.send().map_err(|e| self.map_request_error(e))?;
        read_response(response).map_err(|e| match e {
            ResponseError::Request(e) => self.map_request_error(e),
            ResponseError::Domain(e) => e,
        })
    }
}

enum ResponseError {
    Request(reqwest::Error),
    Domain(Error),
}

fn read_response(response: Response) -> std::result::Result<JsonValue, ResponseError> {
    let status = response.status();
    if !status.is_success() {
        debug!(status = status.as_u16(), "Request rejected");
        return Err(ResponseError::Domain(Error::HttpStatus {
            status_code: status.as_u16(),
            status_message: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }));
    }

    let body = response.bytes().map_err(ResponseError::Request)?;
    parse_body(&body).map_err(ResponseError::Domain)
}

/// Empty 2xx bodies are an empty object, anything else must be JSON
pub fn parse_body(body: &[u8]) -> Result<JsonValue> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(JsonValue::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| Error::malformed(format!("invalid JSON body: {}", e)))
}

fn read_material(path: &std::path::Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        Error::certificates_not_found(format!("cannot read {} at {}: {}", what, path.display(), e))
    })
}

/// Builds an `MtlsTransport` per certificate set
#[derive(Debug, Clone)]
pub struct MtlsTransportFactory {
    timeout: Duration,
}

impl MtlsTransportFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for MtlsTransportFactory {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl TransportFactory for MtlsTransportFactory {
    fn connect(&self, certificates: &CertificateSet) -> Result<Box<dyn HttpTransport>> {
        Ok(Box::new(MtlsTransport::new(certificates, self.timeout)?))
    }
}
