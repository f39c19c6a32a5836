//! Compass client SDK: account handles over pluggable ledger collaborators.

pub mod account;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod registry;
pub mod request;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use account::AccountHandle;
pub use collaborators::{
    AccountActivator, BalanceReader, Collaborators, PaymentWatcher, TransactionDispatcher,
    WatcherFactory,
};
pub use config::ClientConfig;
pub use error::{AccountError, OperationFailure, Result};
pub use identity::LedgerIdentity;
pub use registry::AccountRegistry;
pub use request::Request;
pub use types::{Address, Balance, PaymentInfo, TransactionId};

/// Install a `fmt` subscriber. `RUST_LOG` overrides `default_level`.
/// Returns false if a global subscriber was already set.
pub fn init_tracing(default_level: &str) -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
