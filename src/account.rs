//! Account handle: the single entry point for account-level operations.
//!
//! A handle wraps one [`LedgerIdentity`] and forwards every call to exactly
//! one collaborator after checking that it has not been deleted. Deletion
//! is one-way and is driven by the registry that owns the handle.

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::collaborators::{Collaborators, PaymentWatcher};
use crate::error::{AccountError, Result};
use crate::identity::LedgerIdentity;
use crate::request::Request;
use crate::types::{Address, Balance, TransactionId};

pub struct AccountHandle {
    identity: LedgerIdentity,
    collaborators: Collaborators,
    deleted: AtomicBool,
}

impl AccountHandle {
    pub fn new(identity: LedgerIdentity, collaborators: Collaborators) -> Self {
        Self {
            identity,
            collaborators,
            deleted: AtomicBool::new(false),
        }
    }

    /// Public address of the account, or `None` once the handle is deleted
    pub fn public_address(&self) -> Option<Address> {
        if self.is_deleted() {
            return None;
        }
        Some(self.identity.address().clone())
    }

    /// Send `amount` to `destination` without a memo
    pub fn send_payment(
        &self,
        destination: &Address,
        passphrase: &str,
        amount: Decimal,
    ) -> Result<TransactionId> {
        self.check_valid()?;
        debug!("Sending {} from {} to {}", amount, self.identity.address(), destination);
        self.collaborators
            .dispatcher
            .submit(&self.identity, passphrase, destination, amount)
    }

    /// Send `amount` to `destination` with an optional memo
    pub fn send_payment_with_memo(
        &self,
        destination: &Address,
        passphrase: &str,
        amount: Decimal,
        memo: Option<&str>,
    ) -> Result<TransactionId> {
        self.check_valid()?;
        debug!(
            "Sending {} from {} to {} (memo: {:?})",
            amount,
            self.identity.address(),
            destination,
            memo
        );
        self.collaborators
            .dispatcher
            .submit_with_memo(&self.identity, passphrase, destination, amount, memo)
    }

    /// Fresh balance read from the ledger
    pub fn balance(&self) -> Result<Balance> {
        self.check_valid()?;
        debug!("Reading balance of {}", self.identity.address());
        self.collaborators.balance_reader.read(&self.identity)
    }

    /// Activate the account on the ledger. Repeating the call is not
    /// guaranteed to succeed; that policy belongs to the activator.
    pub fn activate(&self, passphrase: &str) -> Result<()> {
        self.check_valid()?;
        debug!("Activating {}", self.identity.address());
        self.collaborators.activator.activate(&self.identity, passphrase)
    }

    /// Subscribe to incoming payments.
    ///
    /// Not gated on deletion: a deleted handle can still hand out watchers,
    /// and watchers outlive the handle.
    pub fn create_payment_watcher(&self) -> PaymentWatcher {
        self.collaborators.watcher_factory.create(&self.identity)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    /// Permanently retire this handle. Idempotent.
    pub(crate) fn mark_deleted(&self) {
        if !self.deleted.swap(true, Ordering::AcqRel) {
            debug!("Account {} marked deleted", self.identity.address());
        }
    }

    fn check_valid(&self) -> Result<()> {
        if self.is_deleted() {
            warn!("Rejected call on deleted account {}", self.identity.address());
            return Err(AccountError::AccountDeleted);
        }
        Ok(())
    }

    // Non-blocking variants. Liveness is checked when the job runs, not
    // when the request is created.

    pub fn send_payment_request(
        self: &Arc<Self>,
        destination: Address,
        passphrase: String,
        amount: Decimal,
    ) -> Request<TransactionId> {
        let account = Arc::clone(self);
        Request::spawn(move || account.send_payment(&destination, &passphrase, amount))
    }

    pub fn send_payment_with_memo_request(
        self: &Arc<Self>,
        destination: Address,
        passphrase: String,
        amount: Decimal,
        memo: Option<String>,
    ) -> Request<TransactionId> {
        let account = Arc::clone(self);
        Request::spawn(move || {
            account.send_payment_with_memo(&destination, &passphrase, amount, memo.as_deref())
        })
    }

    pub fn balance_request(self: &Arc<Self>) -> Request<Balance> {
        let account = Arc::clone(self);
        Request::spawn(move || account.balance())
    }

    pub fn activate_request(self: &Arc<Self>, passphrase: String) -> Request<()> {
        let account = Arc::clone(self);
        Request::spawn(move || account.activate(&passphrase))
    }
}
