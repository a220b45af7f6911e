//! Bank credential domain model
//!
//! Credentials are owned by the wallet/connection record in an external store.
//! The core only ever reads them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Metadata blob stored on a wallet record (camelCase JSON, as persisted by
/// the web application)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletMetadata {
    #[serde(default)]
    pub application_key: Option<String>,
    #[serde(default)]
    pub client_basic: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub agencia: Option<String>,
    #[serde(default)]
    pub conta: Option<String>,
    /// Per-connection override of the API base URL
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(flatten)]
    pub certificates: CertificateBlobs,
}

/// Base64-encoded certificate material optionally carried in wallet metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateBlobs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_cert_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_base64: Option<String>,
}

impl CertificateBlobs {
    /// All three blobs present and non-blank
    pub fn is_complete(&self) -> bool {
        [
            &self.ca_cert_base64,
            &self.client_cert_base64,
            &self.private_key_base64,
        ]
        .iter()
        .all(|blob| blob.as_deref().map(|b| !b.trim().is_empty()).unwrap_or(false))
    }
}

/// Credentials needed to call the statement API for one connection
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankCredential {
    pub application_key: String,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    #[serde(skip_serializing)]
    pub basic_auth_token: String,
    pub api_base_url: Option<String>,
    pub agency_number: Option<String>,
    pub account_number: Option<String>,
    /// Scope id of the certificate directory (wallet id)
    pub certificate_bundle_ref: String,
}

// Hand-written so secrets never reach a log line through `{:?}`
impl fmt::Debug for BankCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankCredential")
            .field("application_key", &mask(&self.application_key))
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("basic_auth_token", &mask(&self.basic_auth_token))
            .field("api_base_url", &self.api_base_url)
            .field("agency_number", &self.agency_number)
            .field("account_number", &self.account_number)
            .field("certificate_bundle_ref", &self.certificate_bundle_ref)
            .finish()
    }
}

/// Mask a secret, keeping at most the last four characters
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{}", tail)
}
