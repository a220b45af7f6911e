//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod transport;
mod wallet_store;

pub use transport::{
    redact_headers, HttpMethod, HttpRequest, HttpTransport, TransportFactory, SENSITIVE_HEADERS,
};
pub use wallet_store::WalletStore;
