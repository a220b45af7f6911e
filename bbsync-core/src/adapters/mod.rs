//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest + rustls mutual-TLS client for HttpTransport / TransportFactory
//! - JSON file for WalletStore
//! - Mock statement server for testing

pub mod json_wallet;
pub mod mtls;

#[cfg(test)]
pub mod bb_mock;
