//! Credential resolver
//!
//! Turns a connection reference into the bearer token and application key
//! used on statement requests. Two modes:
//!
//! - pass-through: the caller already holds a token and hands it in as the
//!   connection reference
//! - stored: the wallet's `clientBasic` is used directly as the token
//!
//! No OAuth token exchange happens here.

use std::sync::Arc;

use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{BankCredential, WalletMetadata};
use crate::ports::WalletStore;

/// Connection references at least this long (and without whitespace) are
/// treated as ready-made bearer tokens
pub const PASS_THROUGH_MIN_LEN: usize = 100;

/// Outcome of credential resolution
#[derive(Debug, Clone)]
pub enum ResolvedCredential {
    PassThrough { token: String },
    Stored(BankCredential),
}

impl ResolvedCredential {
    pub fn bearer_token(&self) -> &str {
        match self {
            Self::PassThrough { token } => token,
            Self::Stored(credential) => &credential.basic_auth_token,
        }
    }

    /// Application key held by the wallet, if any
    pub fn application_key(&self) -> Option<&str> {
        match self {
            Self::PassThrough { .. } => None,
            Self::Stored(credential) => {
                Some(credential.application_key.as_str()).filter(|k| !k.is_empty())
            }
        }
    }

    pub fn credential(&self) -> Option<&BankCredential> {
        match self {
            Self::PassThrough { .. } => None,
            Self::Stored(credential) => Some(credential),
        }
    }
}

/// Whether a connection reference is itself a token
pub fn looks_like_token(connection_ref: &str) -> bool {
    connection_ref.len() >= PASS_THROUGH_MIN_LEN
        && !connection_ref.chars().any(char::is_whitespace)
}

/// Resolves credentials against a wallet store
pub struct CredentialResolver {
    store: Arc<dyn WalletStore>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn WalletStore>) -> Self {
        Self { store }
    }

    /// Load the wallet and resolve
    ///
    /// `wallet_ref` falls back to `connection_ref` when empty.
    pub fn resolve(&self, connection_ref: &str, wallet_ref: &str) -> Result<ResolvedCredential> {
        self.resolve_connection(connection_ref, wallet_ref)
            .map(|connection| connection.credential)
    }

    /// Resolve and keep the wallet metadata for later steps
    ///
    /// A pass-through token still loads the wallet named by `wallet_ref`, so
    /// its certificates and account numbers stay reachable.
    pub fn resolve_connection(
        &self,
        connection_ref: &str,
        wallet_ref: &str,
    ) -> Result<ResolvedConnection> {
        let wallet_id = wallet_id(connection_ref, wallet_ref).to_string();
        let metadata = if wallet_id.is_empty() {
            None
        } else {
            self.store.wallet_metadata(&wallet_id)?
        };
        let credential = resolve_from_metadata(connection_ref, &wallet_id, metadata.as_ref())?;

        Ok(ResolvedConnection {
            wallet_id,
            metadata,
            credential,
        })
    }
}

/// Credential plus the wallet it came from
#[derive(Debug, Clone)]
pub struct ResolvedConnection {
    /// Empty when a pass-through token was given without a wallet
    pub wallet_id: String,
    pub metadata: Option<WalletMetadata>,
    pub credential: ResolvedCredential,
}

/// The wallet a request is scoped to
///
/// Falls back to `connection_ref`, unless that is itself a token.
pub fn wallet_id<'a>(connection_ref: &'a str, wallet_ref: &'a str) -> &'a str {
    if !wallet_ref.trim().is_empty() {
        wallet_ref.trim()
    } else if looks_like_token(connection_ref) {
        ""
    } else {
        connection_ref.trim()
    }
}

/// Resolve from already-loaded metadata
pub fn resolve_from_metadata(
    connection_ref: &str,
    wallet_id: &str,
    metadata: Option<&WalletMetadata>,
) -> Result<ResolvedCredential> {
    if looks_like_token(connection_ref) {
        debug!("Connection reference is a bearer token, passing through");
        return Ok(ResolvedCredential::PassThrough {
            token: connection_ref.to_string(),
        });
    }

    let metadata = metadata.ok_or_else(|| {
        Error::credentials(format!("wallet '{}' not found", wallet_id))
    })?;

    let token = non_empty(metadata.client_basic.as_deref())
        .map(strip_scheme)
        .ok_or_else(|| Error::credentials(format!("wallet '{}' has no clientBasic", wallet_id)))?;

    Ok(ResolvedCredential::Stored(BankCredential {
        application_key: non_empty(metadata.application_key.as_deref())
            .unwrap_or_default()
            .to_string(),
        client_id: non_empty(metadata.client_id.as_deref()).map(str::to_string),
        client_secret: non_empty(metadata.client_secret.as_deref()).map(str::to_string),
        basic_auth_token: token.to_string(),
        api_base_url: non_empty(metadata.api_url.as_deref()).map(str::to_string),
        agency_number: non_empty(metadata.agencia.as_deref()).map(str::to_string),
        account_number: non_empty(metadata.conta.as_deref()).map(str::to_string),
        certificate_bundle_ref: wallet_id.to_string(),
    }))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Stored tokens sometimes keep their "Bearer " prefix
fn strip_scheme(token: &str) -> &str {
    token
        .strip_prefix("Bearer ")
        .or_else(|| token.strip_prefix("bearer "))
        .map(str::trim)
        .unwrap_or(token)
}
