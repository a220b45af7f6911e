//! Certificate set for mutual TLS

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// CA bundle filename inside a connection's certificate directory
pub const CA_FILENAME: &str = "ca.pem";
/// Client certificate filename
pub const CLIENT_CERT_FILENAME: &str = "client-cert.pem";
/// Private key filename
pub const PRIVATE_KEY_FILENAME: &str = "client-key.pem";

/// The three files one connection needs for mutual TLS
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSet {
    pub ca_cert_path: PathBuf,
    pub client_cert_path: PathBuf,
    pub private_key_path: PathBuf,
}

impl CertificateSet {
    /// Fixed file layout under a connection directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            ca_cert_path: dir.join(CA_FILENAME),
            client_cert_path: dir.join(CLIENT_CERT_FILENAME),
            private_key_path: dir.join(PRIVATE_KEY_FILENAME),
        }
    }

    pub fn paths(&self) -> [&Path; 3] {
        [
            &self.ca_cert_path,
            &self.client_cert_path,
            &self.private_key_path,
        ]
    }

    /// True when every file exists and is non-empty
    pub fn is_usable(&self) -> bool {
        self.paths().iter().all(|p| is_non_empty_file(p))
    }
}

fn is_non_empty_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
