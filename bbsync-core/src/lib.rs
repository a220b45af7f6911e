//! bbsync core - Banco do Brasil statement integration
//!
//! This crate implements the bank-integration logic following hexagonal architecture:
//!
//! - **domain**: Core entities (line items, normalized transactions, wire dates)
//! - **ports**: Trait definitions for external dependencies (HttpTransport, WalletStore)
//! - **services**: Business logic (certificates, credentials, pagination, classification)
//! - **adapters**: Concrete implementations (mutual-TLS reqwest client, JSON wallet file)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::json_wallet::JsonWalletStore;
use adapters::mtls::MtlsTransportFactory;
use config::Config;
use ports::{TransportFactory, WalletStore};
use services::BankService;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::wire_date::DateParam;
pub use domain::{
    AccountBalance, AggregatedStatement, CertificateSet, Direction, NormalizedTransaction,
    WalletMetadata,
};
pub use services::{CertificateResolution, StatementOptions};

/// Main context for bank operations
///
/// Holds the configuration and the bank service wired to its adapters.
pub struct BankContext {
    pub config: Config,
    pub app_dir: PathBuf,
    pub bank_service: BankService,
}

impl BankContext {
    /// Create a context backed by the wallet file and the mTLS transport
    pub fn new(app_dir: &Path) -> Result<Self> {
        let config = Config::load(app_dir)?;
        let wallets = Arc::new(JsonWalletStore::new(config.wallets_path.clone()));
        let transports = Arc::new(MtlsTransportFactory::new(config.timeout));
        Self::with_adapters(app_dir, config, wallets, transports)
    }

    /// Create a context with explicit adapters
    pub fn with_adapters(
        app_dir: &Path,
        config: Config,
        wallets: Arc<dyn WalletStore>,
        transports: Arc<dyn TransportFactory>,
    ) -> Result<Self> {
        let bank_service = BankService::new(&config, wallets, transports)?;

        Ok(Self {
            config,
            app_dir: app_dir.to_path_buf(),
            bank_service,
        })
    }
}
