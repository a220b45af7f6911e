//! Configuration management
//!
//! Settings live in `<app_dir>/settings.json`:
//! ```json
//! {
//!   "apiBaseUrl": "https://api-extratos.bb.com.br/extratos/v1",
//!   "certificatesDir": "/home/me/.bbsync/certs",
//!   "pageSize": 200,
//!   "timeoutSecs": 30,
//!   "balanceLookbackDays": 30,
//!   "keywordRules": { "debit": [...], "credit": [...] }
//! }
//! ```
//! Keys this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::result::Error;
use crate::services::keywords::KeywordRules;
use crate::services::statement::{clamp_page_size, DEFAULT_PAGE_SIZE};

pub const DEFAULT_API_BASE_URL: &str = "https://api-extratos.bb.com.br/extratos/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BALANCE_LOOKBACK_DAYS: u32 = 30;

pub const SETTINGS_FILENAME: &str = "settings.json";
pub const WALLETS_FILENAME: &str = "wallets.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    certificates_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    balance_lookback_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    keyword_rules: Option<KeywordRules>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Effective configuration (file values, env overrides, defaults)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub certificates_dir: PathBuf,
    pub wallets_path: PathBuf,
    pub page_size: u32,
    pub timeout: Duration,
    pub balance_lookback_days: u32,
    pub keyword_rules: KeywordRules,
}

impl Config {
    /// Defaults rooted at `app_dir`
    pub fn defaults(app_dir: &Path) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            certificates_dir: app_dir.join("certs"),
            wallets_path: app_dir.join(WALLETS_FILENAME),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            balance_lookback_days: DEFAULT_BALANCE_LOOKBACK_DAYS,
            keyword_rules: KeywordRules::default(),
        }
    }

    /// Load config from the app directory
    ///
    /// The API base URL and certificates directory can be overridden with
    /// `BB_API_BASE_URL` and `BB_CERTS_DIR`.
    pub fn load(app_dir: &Path) -> Result<Self> {
        Self::load_with_env(app_dir, |key| std::env::var(key).ok())
    }

    /// Same as `load` with an injectable environment lookup
    pub fn load_with_env(app_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = read_settings(app_dir)?;
        let mut config = Self::defaults(app_dir);

        if let Some(url) = env("BB_API_BASE_URL").or(raw.api_base_url) {
            config.api_base_url = url;
        }
        if let Some(dir) = env("BB_CERTS_DIR").map(PathBuf::from).or(raw.certificates_dir) {
            config.certificates_dir = dir;
        }
        if let Some(page_size) = raw.page_size {
            config.page_size = clamp_page_size(page_size);
        }
        if let Some(secs) = raw.timeout_secs.filter(|s| *s > 0) {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(days) = raw.balance_lookback_days {
            config.balance_lookback_days = days;
        }
        if let Some(rules) = raw.keyword_rules {
            config.keyword_rules = rules;
        }

        validate_base_url(&config.api_base_url)?;
        Ok(config)
    }

    /// Save config to the app directory
    /// Preserves other settings this crate doesn't manage
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join(SETTINGS_FILENAME);
        let mut settings = read_settings(app_dir)?;

        settings.api_base_url = Some(self.api_base_url.clone());
        settings.certificates_dir = Some(self.certificates_dir.clone());
        settings.page_size = Some(self.page_size);
        settings.timeout_secs = Some(self.timeout.as_secs());
        settings.balance_lookback_days = Some(self.balance_lookback_days);
        settings.keyword_rules = Some(self.keyword_rules.clone());

        std::fs::create_dir_all(app_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

fn read_settings(app_dir: &Path) -> Result<SettingsFile> {
    let settings_path = app_dir.join(SETTINGS_FILENAME);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid settings in {}", settings_path.display()))
}

/// An API base URL must be absolute https
pub fn validate_base_url(raw: &str) -> std::result::Result<Url, Error> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", raw, e)))?;
    if url.scheme() != "https" {
        return Err(Error::Config(format!(
            "API base URL must use https, got '{}'",
            raw
        )));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::Config(format!("API base URL '{}' has no host", raw)));
    }
    Ok(url)
}
