//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod bank;
pub mod certificates;
pub mod classifier;
pub mod credentials;
pub mod keywords;
pub mod statement;

pub use bank::{BankService, StatementOptions};
pub use certificates::{CertificateManager, CertificateResolution};
pub use classifier::{
    balance_or_zero, compose_description, extract_balance, format_tax_id, is_balance_marker,
    TransactionClassifier, BALANCE_MARKERS,
};
pub use credentials::{CredentialResolver, ResolvedConnection, ResolvedCredential};
pub use keywords::{KeywordMatcher, KeywordRules};
pub use statement::{StatementFetcher, MAX_PAGES, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
