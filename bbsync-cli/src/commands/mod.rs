//! CLI command implementations

pub mod balance;
pub mod certs;
pub mod statement;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use bbsync_core::BankContext;

/// Identifies the account and the credentials to use
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Wallet id holding credentials and certificates
    #[arg(long, env = "BB_WALLET")]
    pub wallet: String,
    /// Connection reference or bearer token (defaults to the wallet id)
    #[arg(long, env = "BB_TOKEN", hide_env_values = true)]
    pub connection: Option<String>,
    /// Agency number (defaults to the wallet's agencia)
    #[arg(long, default_value = "")]
    pub agency: String,
    /// Account number (defaults to the wallet's conta)
    #[arg(long, default_value = "")]
    pub account: String,
    /// Application key (defaults to the wallet's applicationKey)
    #[arg(long, default_value = "", hide_default_value = true)]
    pub app_key: String,
}

impl ConnectionArgs {
    pub fn connection_ref(&self) -> &str {
        self.connection.as_deref().unwrap_or(self.wallet.as_str())
    }
}

/// Get the bbsync directory from environment or default
pub fn get_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BBSYNC_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".bbsync"))
        .context("Could not find home directory; set BBSYNC_DIR")
}

/// Get or create the bank context
pub fn get_context() -> Result<BankContext> {
    let app_dir = get_app_dir()?;

    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create bbsync directory: {:?}", app_dir))?;

    BankContext::new(&app_dir).context("Failed to initialize bbsync context")
}
