//! Wallet store port - read-only access to connection metadata

use crate::domain::result::Result;
use crate::domain::WalletMetadata;

/// Key-value lookup of wallet metadata by wallet id
///
/// The wallet records are owned by the surrounding application; the core
/// never writes through this trait.
pub trait WalletStore: Send + Sync {
    /// `Ok(None)` when no wallet with this id exists
    fn wallet_metadata(&self, wallet_id: &str) -> Result<Option<WalletMetadata>>;
}
