//! In-process ledger implementing all four collaborator roles.
//!
//! Useful for local development and tests: it keeps balances in memory,
//! enforces activation, signs every payment with the sender's unlocked key
//! and fans payments out to watchers.

use chrono::Utc;
use ed25519_dalek::Signer;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::collaborators::{
    AccountActivator, BalanceReader, PaymentWatcher, TransactionDispatcher, WatcherFactory,
};
use crate::error::{OperationFailure, Result};
use crate::identity::LedgerIdentity;
use crate::types::{Address, Balance, PaymentInfo, TransactionId, LEDGER_PRECISION};

/// Longest memo the ledger accepts, in bytes
pub const MAX_MEMO_LEN: usize = 28;

#[derive(Debug, Clone, Default)]
struct LedgerAccount {
    balance: Decimal,
    activated: bool,
    sequence: u64,
}

pub struct MemoryLedger {
    accounts: Mutex<HashMap<Address, LedgerAccount>>,
    feed: broadcast::Sender<PaymentInfo>,
}

impl MemoryLedger {
    /// `watcher_capacity` bounds how many payments a slow watcher may fall behind
    pub fn new(watcher_capacity: usize) -> Self {
        let (feed, _) = broadcast::channel(watcher_capacity.max(1));
        Self {
            accounts: Mutex::new(HashMap::new()),
            feed,
        }
    }

    /// Register an address on the ledger (not yet activated)
    pub fn create_account(&self, address: &Address) -> Result<()> {
        let mut accounts = self.accounts()?;
        accounts.entry(address.clone()).or_default();
        debug!("Ledger account {} created", address);
        Ok(())
    }

    /// Credit an activated account out of thin air (faucet)
    pub fn fund(&self, address: &Address, amount: Decimal) -> Result<()> {
        validate_amount(amount)?;
        let mut accounts = self.accounts()?;
        let account = activated_mut(&mut accounts, address)?;
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| OperationFailure::InvalidAmount("balance overflow".to_string()))?;
        Ok(())
    }

    pub fn is_activated(&self, address: &Address) -> Result<bool> {
        Ok(self
            .accounts()?
            .get(address)
            .map(|a| a.activated)
            .unwrap_or(false))
    }

    /// Total of all balances
    pub fn total_supply(&self) -> Result<Decimal> {
        self.accounts()?
            .values()
            .try_fold(Decimal::ZERO, |total, a| total.checked_add(a.balance))
            .ok_or_else(|| {
                OperationFailure::InvalidAmount("total supply overflow".to_string()).into()
            })
    }

    fn accounts(&self) -> Result<MutexGuard<'_, HashMap<Address, LedgerAccount>>> {
        self.accounts
            .lock()
            .map_err(|_| OperationFailure::Interrupted("ledger state poisoned".to_string()).into())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_WATCHER_CAPACITY)
    }
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(OperationFailure::InvalidAmount(format!("{} is not positive", amount)).into());
    }
    if amount.normalize().scale() > LEDGER_PRECISION {
        return Err(OperationFailure::InvalidAmount(format!(
            "{} exceeds {} decimal places",
            amount, LEDGER_PRECISION
        ))
        .into());
    }
    Ok(())
}

fn activated_mut<'a>(
    accounts: &'a mut HashMap<Address, LedgerAccount>,
    address: &Address,
) -> Result<&'a mut LedgerAccount> {
    let account = accounts
        .get_mut(address)
        .ok_or_else(|| OperationFailure::AccountNotFound(address.clone()))?;
    if !account.activated {
        return Err(OperationFailure::AccountNotActivated(address.clone()).into());
    }
    Ok(account)
}

impl TransactionDispatcher for MemoryLedger {
    fn submit(
        &self,
        identity: &LedgerIdentity,
        passphrase: &str,
        destination: &Address,
        amount: Decimal,
    ) -> Result<TransactionId> {
        self.submit_with_memo(identity, passphrase, destination, amount, None)
    }

    fn submit_with_memo(
        &self,
        identity: &LedgerIdentity,
        passphrase: &str,
        destination: &Address,
        amount: Decimal,
        memo: Option<&str>,
    ) -> Result<TransactionId> {
        validate_amount(amount)?;
        if let Some(memo) = memo {
            if memo.len() > MAX_MEMO_LEN {
                return Err(OperationFailure::TransactionRejected(format!(
                    "memo longer than {} bytes",
                    MAX_MEMO_LEN
                ))
                .into());
            }
        }
        let source = identity.address();
        if source == destination {
            return Err(
                OperationFailure::TransactionRejected("source equals destination".to_string())
                    .into(),
            );
        }

        // Key derivation is slow, keep it outside the state lock
        let signing_key = identity.unlock(passphrase)?;

        let mut accounts = self.accounts()?;
        let receiver_balance = activated_mut(&mut accounts, destination)?
            .balance
            .checked_add(amount)
            .ok_or_else(|| {
                OperationFailure::TransactionRejected("receiver balance overflow".to_string())
            })?;
        let sender = activated_mut(&mut accounts, source)?;
        if sender.balance < amount {
            return Err(OperationFailure::InsufficientBalance.into());
        }

        let payload = format!(
            "{}:{}:{}:{}:{}",
            source,
            destination,
            amount,
            memo.unwrap_or(""),
            sender.sequence
        );
        let signature = hex::encode(signing_key.sign(payload.as_bytes()).to_bytes());

        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hasher.update(signature.as_bytes());
        let transaction_id = TransactionId::new(hex::encode(hasher.finalize()));

        sender.balance -= amount;
        sender.sequence += 1;
        if let Some(receiver) = accounts.get_mut(destination) {
            receiver.balance = receiver_balance;
        }
        drop(accounts);

        info!("Payment {} of {} from {} to {}", transaction_id, amount, source, destination);

        // No subscribers is not an error
        let _ = self.feed.send(PaymentInfo {
            source: source.clone(),
            destination: destination.clone(),
            amount,
            memo: memo.map(str::to_string),
            transaction_id: transaction_id.clone(),
            created_at: Utc::now(),
        });

        Ok(transaction_id)
    }
}

impl BalanceReader for MemoryLedger {
    fn read(&self, identity: &LedgerIdentity) -> Result<Balance> {
        let mut accounts = self.accounts()?;
        let account = activated_mut(&mut accounts, identity.address())?;
        Ok(Balance::new(account.balance))
    }
}

impl AccountActivator for MemoryLedger {
    fn activate(&self, identity: &LedgerIdentity, passphrase: &str) -> Result<()> {
        let address = identity.address();
        // Activation must be authorized by the account key
        identity.unlock(passphrase)?;

        let mut accounts = self.accounts()?;
        let account = accounts
            .get_mut(address)
            .ok_or_else(|| OperationFailure::AccountNotFound(address.clone()))?;
        if account.activated {
            return Err(OperationFailure::AlreadyActivated(address.clone()).into());
        }

        account.activated = true;
        info!("Account {} activated", address);
        Ok(())
    }
}

impl WatcherFactory for MemoryLedger {
    fn create(&self, identity: &LedgerIdentity) -> PaymentWatcher {
        PaymentWatcher::new(identity.address().clone(), self.feed.subscribe())
    }
}
