//! Interfaces the account handle delegates to.
//!
//! Each call is synchronous and blocks until the ledger answers; timeouts
//! and retries belong to the implementor.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

use crate::error::Result;
use crate::identity::LedgerIdentity;
use crate::types::{Address, Balance, PaymentInfo, TransactionId};

/// Builds, signs and submits payment transactions
pub trait TransactionDispatcher: Send + Sync {
    fn submit(
        &self,
        identity: &LedgerIdentity,
        passphrase: &str,
        destination: &Address,
        amount: Decimal,
    ) -> Result<TransactionId>;

    fn submit_with_memo(
        &self,
        identity: &LedgerIdentity,
        passphrase: &str,
        destination: &Address,
        amount: Decimal,
        memo: Option<&str>,
    ) -> Result<TransactionId>;
}

pub trait BalanceReader: Send + Sync {
    fn read(&self, identity: &LedgerIdentity) -> Result<Balance>;
}

/// One-time activation of an identity on the ledger
pub trait AccountActivator: Send + Sync {
    fn activate(&self, identity: &LedgerIdentity, passphrase: &str) -> Result<()>;
}

pub trait WatcherFactory: Send + Sync {
    fn create(&self, identity: &LedgerIdentity) -> PaymentWatcher;
}

/// The four collaborators injected into every account handle
#[derive(Clone)]
pub struct Collaborators {
    pub dispatcher: Arc<dyn TransactionDispatcher>,
    pub balance_reader: Arc<dyn BalanceReader>,
    pub activator: Arc<dyn AccountActivator>,
    pub watcher_factory: Arc<dyn WatcherFactory>,
}

impl Collaborators {
    /// Use one object for all four roles
    pub fn from_single<T>(inner: Arc<T>) -> Self
    where
        T: TransactionDispatcher + BalanceReader + AccountActivator + WatcherFactory + 'static,
    {
        Self {
            dispatcher: inner.clone(),
            balance_reader: inner.clone(),
            activator: inner.clone(),
            watcher_factory: inner,
        }
    }
}

/// Live subscription to payments received by one address.
///
/// Lives independently of the handle that created it; it ends only when
/// the feed it is subscribed to is dropped.
pub struct PaymentWatcher {
    address: Address,
    receiver: broadcast::Receiver<PaymentInfo>,
}

impl PaymentWatcher {
    pub fn new(address: Address, receiver: broadcast::Receiver<PaymentInfo>) -> Self {
        Self { address, receiver }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Wait for the next incoming payment. Returns `None` once the feed is closed.
    pub async fn recv(&mut self) -> Option<PaymentInfo> {
        loop {
            match self.receiver.recv().await {
                Ok(payment) if payment.destination == self.address => return Some(payment),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Payment watcher for {} lagged, {} payments dropped",
                        self.address, skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-delivered incoming payment, if any
    pub fn try_recv(&mut self) -> Option<PaymentInfo> {
        loop {
            match self.receiver.try_recv() {
                Ok(payment) if payment.destination == self.address => return Some(payment),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(
                        "Payment watcher for {} lagged, {} payments dropped",
                        self.address, skipped
                    );
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn payment(to: &str, amount: i64) -> PaymentInfo {
        PaymentInfo {
            source: Address::from("src"),
            destination: Address::from(to),
            amount: Decimal::from(amount),
            memo: None,
            transaction_id: TransactionId::new(format!("tx{}", amount)),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_watcher_filters_by_destination() {
        let (tx, rx) = broadcast::channel(8);
        let mut watcher = PaymentWatcher::new(Address::from("bob"), rx);

        tx.send(payment("alice", 1)).unwrap();
        tx.send(payment("bob", 2)).unwrap();

        let got = watcher.try_recv().unwrap();
        assert_eq!(got.amount, Decimal::from(2));
        assert!(watcher.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_watcher_ends_when_feed_closes() {
        let (tx, rx) = broadcast::channel(8);
        let mut watcher = PaymentWatcher::new(Address::from("bob"), rx);

        tx.send(payment("bob", 5)).unwrap();
        drop(tx);

        assert_eq!(watcher.recv().await.unwrap().amount, Decimal::from(5));
        assert!(watcher.recv().await.is_none());
    }
}
