//! Statement fetcher
//!
//! Walks every page of a statement through an `HttpTransport`, strictly one
//! page after another, then classifies the collected lines in a single pass.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::{AggregatedStatement, RawLineItem, StatementPage, StatementRequest};
use crate::ports::{HttpRequest, HttpTransport};
use crate::services::classifier::{extract_balance, TransactionClassifier};

pub const MIN_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Statements claiming more pages than this are rejected
pub const MAX_PAGES: u32 = 1000;

/// Clamp a page size to the range the provider accepts
pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// Build the statement URL for one page
///
/// `{base}/conta-corrente/agencia/{agency}/conta/{account}?numeroPagina=..`
pub fn statement_url(base_url: &str, request: &StatementRequest) -> Result<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("API base URL '{}' cannot have a path", base_url)))?
        .pop_if_empty()
        .extend([
            "conta-corrente",
            "agencia",
            request.agency.trim(),
            "conta",
            request.account.trim(),
        ]);

    url.query_pairs_mut()
        .append_pair("numeroPagina", &request.page_number.to_string())
        .append_pair(
            "quantidadeRegistros",
            &clamp_page_size(request.page_size).to_string(),
        )
        .append_pair("dataInicioSolicitacao", &request.date_from)
        .append_pair("dataFimSolicitacao", &request.date_to);

    Ok(url.into())
}

/// Build the full GET request for one page
pub fn build_page_request(
    base_url: &str,
    request: &StatementRequest,
    bearer_token: &str,
) -> Result<HttpRequest> {
    Ok(HttpRequest::get(statement_url(base_url, request)?)
        .header("Authorization", format!("Bearer {}", bearer_token))
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .header("gw-dev-app-key", request.app_key.as_str())
        .header("X-Application-Key", request.app_key.as_str()))
}

/// Paginated fetcher bound to one transport and base URL
pub struct StatementFetcher<'a> {
    transport: &'a dyn HttpTransport,
    classifier: &'a TransactionClassifier,
    base_url: &'a str,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl<'a> StatementFetcher<'a> {
    pub fn new(
        transport: &'a dyn HttpTransport,
        classifier: &'a TransactionClassifier,
        base_url: &'a str,
    ) -> Self {
        Self {
            transport,
            classifier,
            base_url,
            timeout: None,
            deadline: None,
        }
    }

    /// Configured per-request timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute deadline for the whole fetch
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Fetch one page
    pub fn fetch_page(&self, request: &StatementRequest, bearer_token: &str) -> Result<StatementPage> {
        let timeout = self.request_timeout(request.page_number)?;
        let http_request =
            build_page_request(self.base_url, request, bearer_token)?.with_timeout(timeout);

        debug!(
            page = request.page_number,
            url = %http_request.url,
            headers = ?http_request.redacted_headers(),
            "Requesting statement page"
        );

        let body = self.transport.send(&http_request)?;
        StatementPage::from_json(body)
    }

    /// Fetch every page and return the classified aggregate
    ///
    /// Any failing page fails the whole statement; no partial result is
    /// returned.
    pub fn fetch_full_statement(
        &self,
        request: &StatementRequest,
        bearer_token: &str,
        today: NaiveDate,
    ) -> Result<AggregatedStatement> {
        let first = self.fetch_page(&request.for_page(1), bearer_token)?;
        let total_record_count = first.total_record_count;

        if first.total_pages == 0 && first.items.is_empty() {
            return Ok(AggregatedStatement {
                total_record_count,
                ..Default::default()
            });
        }

        // Lines without a page count still form one page
        let total_pages = first.total_pages.max(1);

        if total_pages > MAX_PAGES {
            return Err(Error::malformed(format!(
                "statement reports {} pages, more than the {} allowed",
                total_pages, MAX_PAGES
            )));
        }

        info!(
            page = 1,
            total_pages,
            items = first.items.len(),
            "Fetched statement page"
        );

        let mut raw: Vec<RawLineItem> = first.items;
        for page_number in 2..=total_pages {
            let page = self.fetch_page(&request.for_page(page_number), bearer_token)?;
            info!(
                page = page_number,
                total_pages,
                items = page.items.len(),
                "Fetched statement page"
            );
            raw.extend(page.items);
        }

        let items = self.classifier.normalize_all(&raw, today);
        if items.len() as u64 != u64::from(total_record_count) {
            warn!(
                collected = items.len(),
                expected = total_record_count,
                "Statement item count does not match reported total"
            );
        }

        let balance = extract_balance(&items);
        Ok(AggregatedStatement {
            total_pages,
            total_record_count,
            items,
            balance,
        })
    }

    /// min(configured timeout, time left before the deadline)
    fn request_timeout(&self, page_number: u32) -> Result<Option<Duration>> {
        let Some(deadline) = self.deadline else {
            return Ok(self.timeout);
        };

        let remaining = deadline
            .checked_duration_since(Instant::now())
            .filter(|d| !d.is_zero())
            .ok_or_else(|| {
                Error::transport(format!(
                    "Deadline exceeded before requesting page {}",
                    page_number
                ))
            })?;

        Ok(Some(match self.timeout {
            Some(timeout) => timeout.min(remaining),
            None => remaining,
        }))
    }
}
