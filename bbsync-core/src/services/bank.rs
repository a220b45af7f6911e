//! Bank service - entry point for statement and balance requests
//!
//! Wires credential resolution, certificate resolution, transport creation,
//! pagination and classification together. All per-request data is derived
//! fresh on each call; the only state kept is configuration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Days, Local, NaiveDate};
use tracing::{debug, info};

use crate::config::{validate_base_url, Config};
use crate::domain::result::{Error, Result};
use crate::domain::wire_date::DateParam;
use crate::domain::{AccountBalance, AggregatedStatement, StatementRequest, WalletMetadata};
use crate::ports::{TransportFactory, WalletStore};
use crate::services::certificates::{CertificateManager, CertificateResolution};
use crate::services::classifier::TransactionClassifier;
use crate::services::credentials::{CredentialResolver, ResolvedConnection};
use crate::services::keywords::KeywordMatcher;
use crate::services::statement::{clamp_page_size, StatementFetcher};

/// Optional knobs for `fetch_statement`
#[derive(Debug, Clone, Default)]
pub struct StatementOptions {
    /// Defaults to today minus the configured lookback
    pub date_from: Option<DateParam>,
    /// Defaults to today
    pub date_to: Option<DateParam>,
    /// Wallet holding certificates and stored credentials; defaults to the
    /// connection reference
    pub wallet_ref: Option<String>,
    pub page_size: Option<u32>,
    /// Absolute deadline for the whole fetch
    pub deadline: Option<Instant>,
    /// Overrides the local calendar date, mostly for tests
    pub today: Option<NaiveDate>,
}

pub struct BankService {
    api_base_url: String,
    page_size: u32,
    timeout: Duration,
    balance_lookback_days: u32,
    wallets: Arc<dyn WalletStore>,
    resolver: CredentialResolver,
    certificates: CertificateManager,
    transports: Arc<dyn TransportFactory>,
    classifier: TransactionClassifier,
}

impl BankService {
    pub fn new(
        config: &Config,
        wallets: Arc<dyn WalletStore>,
        transports: Arc<dyn TransportFactory>,
    ) -> Result<Self> {
        let keywords = KeywordMatcher::new(&config.keyword_rules)?;

        Ok(Self {
            api_base_url: config.api_base_url.clone(),
            page_size: clamp_page_size(config.page_size),
            timeout: config.timeout,
            balance_lookback_days: config.balance_lookback_days,
            resolver: CredentialResolver::new(Arc::clone(&wallets)),
            wallets,
            certificates: CertificateManager::new(config.certificates_dir.clone()),
            transports,
            classifier: TransactionClassifier::new(keywords),
        })
    }

    pub fn certificate_manager(&self) -> &CertificateManager {
        &self.certificates
    }

    /// Fetch the full, classified statement for an account
    ///
    /// Empty `agency`, `account` or `app_key` are filled from the wallet.
    pub fn fetch_statement(
        &self,
        agency: &str,
        account: &str,
        connection_ref: &str,
        app_key: &str,
        options: StatementOptions,
    ) -> Result<AggregatedStatement> {
        let today = options.today.unwrap_or_else(|| Local::now().date_naive());
        let connection = self
            .resolver
            .resolve_connection(connection_ref, options.wallet_ref.as_deref().unwrap_or(""))?;
        let metadata = connection.metadata.as_ref();

        let agency = pick(agency, metadata.and_then(|m| m.agencia.as_deref()), "agency")?;
        let account = pick(account, metadata.and_then(|m| m.conta.as_deref()), "account")?;
        let stored_key = connection
            .credential
            .application_key()
            .or_else(|| metadata.and_then(|m| m.application_key.as_deref()));
        let app_key = pick(app_key, stored_key, "application key")?;

        let base_url = self.base_url_for(metadata)?;
        let (date_from, date_to) = self.date_range(&options, today)?;

        let resolution = self.certificates_for(&connection)?;
        let transport = self.transports.connect(&resolution.certificates)?;

        let request = StatementRequest {
            agency,
            account,
            connection_ref: connection_ref.to_string(),
            app_key,
            date_from,
            date_to,
            page_number: 1,
            page_size: clamp_page_size(options.page_size.unwrap_or(self.page_size)),
            wallet_ref: connection.wallet_id.clone(),
        };

        info!(
            wallet = %connection.wallet_id,
            agency = %request.agency,
            from = %request.date_from,
            to = %request.date_to,
            "Fetching statement"
        );

        StatementFetcher::new(transport.as_ref(), &self.classifier, &base_url)
            .with_timeout(Some(self.timeout))
            .with_deadline(options.deadline)
            .fetch_full_statement(&request, connection.credential.bearer_token(), today)
    }

    /// Current balance, read from the balance line of a recent statement
    ///
    /// `Ok(None)` means the statement carried no balance line; it is not a
    /// zero balance.
    pub fn fetch_balance(
        &self,
        agency: &str,
        account: &str,
        connection_ref: &str,
        app_key: &str,
        wallet_ref: &str,
    ) -> Result<Option<AccountBalance>> {
        let options = StatementOptions {
            wallet_ref: Some(wallet_ref.to_string()).filter(|w| !w.trim().is_empty()),
            ..Default::default()
        };
        let statement = self.fetch_statement(agency, account, connection_ref, app_key, options)?;
        Ok(statement.balance)
    }

    /// Resolve (and materialize if needed) a wallet's certificates
    pub fn resolve_certificates(&self, wallet_ref: &str) -> Result<CertificateResolution> {
        let wallet_ref = wallet_ref.trim();
        if wallet_ref.is_empty() {
            return Err(Error::validation("wallet reference must not be empty"));
        }
        let metadata = self.wallets.wallet_metadata(wallet_ref)?;
        self.certificates
            .resolve(wallet_ref, metadata.as_ref().map(|m| &m.certificates))
    }

    fn certificates_for(&self, connection: &ResolvedConnection) -> Result<CertificateResolution> {
        if connection.wallet_id.is_empty() {
            return Err(Error::credentials(
                "a wallet reference is required to locate certificates",
            ));
        }
        self.certificates.resolve(
            &connection.wallet_id,
            connection.metadata.as_ref().map(|m| &m.certificates),
        )
    }

    fn base_url_for(&self, metadata: Option<&WalletMetadata>) -> Result<String> {
        let base_url = metadata
            .and_then(|m| m.api_url.as_deref())
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(self.api_base_url.as_str());
        validate_base_url(base_url)?;
        Ok(base_url.to_string())
    }

    /// Wire-encoded (from, to), defaulting to the lookback window
    fn date_range(&self, options: &StatementOptions, today: NaiveDate) -> Result<(String, String)> {
        let default_from = today
            .checked_sub_days(Days::new(u64::from(self.balance_lookback_days)))
            .unwrap_or(today);
        let from = options
            .date_from
            .clone()
            .unwrap_or(DateParam::Calendar(default_from));
        let to = options.date_to.clone().unwrap_or(DateParam::Calendar(today));

        if let (Some(start), Some(end)) = (from.resolved(today), to.resolved(today)) {
            if start > end {
                return Err(Error::validation(format!(
                    "date range is inverted: {} is after {}",
                    start, end
                )));
            }
        }

        let range = (from.to_wire(today), to.to_wire(today));
        debug!(from = %range.0, to = %range.1, "Resolved statement date range");
        Ok(range)
    }
}

/// Caller argument, else stored value, else `CredentialsInsufficient`
fn pick(arg: &str, stored: Option<&str>, field: &str) -> Result<String> {
    let arg = arg.trim();
    if !arg.is_empty() {
        return Ok(arg.to_string());
    }
    stored
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::credentials(format!("no {} given or stored on the wallet", field)))
}
