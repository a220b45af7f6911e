//! JSON file wallet store
//!
//! Reads wallet metadata from a single JSON object keyed by wallet id:
//! ```json
//! { "wallet-1": { "applicationKey": "...", "clientBasic": "...", "agencia": "1234" } }
//! ```
//! The file is read on every lookup so edits made by other tools are picked up.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::WalletMetadata;
use crate::ports::WalletStore;

pub struct JsonWalletStore {
    path: PathBuf,
}

impl JsonWalletStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All wallets in the file; an absent file is an empty store
    pub fn load_all(&self) -> Result<HashMap<String, WalletMetadata>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Wallet file not found");
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Invalid wallet file {}: {}", self.path.display(), e))
        })
    }
}

impl WalletStore for JsonWalletStore {
    fn wallet_metadata(&self, wallet_id: &str) -> Result<Option<WalletMetadata>> {
        Ok(self.load_all()?.remove(wallet_id))
    }
}
