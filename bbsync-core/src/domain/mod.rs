//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! and pure functions - the only I/O is the existence check on certificate
//! files.

mod certificate;
mod credential;
mod statement;
pub mod result;
pub mod wire_date;

pub use certificate::{CertificateSet, CA_FILENAME, CLIENT_CERT_FILENAME, PRIVATE_KEY_FILENAME};
pub use credential::{mask, BankCredential, CertificateBlobs, WalletMetadata};
pub use statement::{
    AccountBalance, AggregatedStatement, Direction, NormalizedTransaction, RawLineItem,
    StatementPage, StatementRequest,
};
pub use wire_date::DateParam;
