//! Owns the lifetime of account handles

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::account::AccountHandle;
use crate::collaborators::Collaborators;
use crate::config::ClientConfig;
use crate::identity::{IdentityError, LedgerIdentity};
use crate::ledger::MemoryLedger;

/// Creates, hands out and deletes account handles.
///
/// Deleting an account marks its handle deleted, so clones of the `Arc`
/// held elsewhere start failing with `AccountDeleted`.
pub struct AccountRegistry {
    config: ClientConfig,
    collaborators: Collaborators,
    accounts: Mutex<Vec<Arc<AccountHandle>>>,
}

impl AccountRegistry {
    pub fn new(config: ClientConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
            accounts: Mutex::new(Vec::new()),
        }
    }

    /// Registry backed by a fresh in-process ledger
    pub fn with_memory_ledger(config: ClientConfig) -> (Self, Arc<MemoryLedger>) {
        let ledger = Arc::new(MemoryLedger::new(config.watcher_capacity));
        let collaborators = Collaborators::from_single(Arc::clone(&ledger));
        (Self::new(config, collaborators), ledger)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a new account with a freshly generated key
    pub fn add_account(&self, passphrase: &str) -> Result<Arc<AccountHandle>, IdentityError> {
        let identity = LedgerIdentity::generate(passphrase, self.config.key_derivation_rounds)?;
        Ok(self.register(identity))
    }

    /// Add an account for an existing 32-byte seed
    pub fn import_account(
        &self,
        seed: &[u8],
        passphrase: &str,
    ) -> Result<Arc<AccountHandle>, IdentityError> {
        let identity =
            LedgerIdentity::from_seed(seed, passphrase, self.config.key_derivation_rounds)?;
        Ok(self.register(identity))
    }

    pub fn account(&self, index: usize) -> Option<Arc<AccountHandle>> {
        self.lock().get(index).cloned()
    }

    pub fn account_count(&self) -> usize {
        self.lock().len()
    }

    /// Remove the account at `index` and retire its handle. No-op if out of range.
    pub fn delete_account(&self, index: usize) {
        let mut accounts = self.lock();
        if index >= accounts.len() {
            return;
        }
        let account = accounts.remove(index);
        account.mark_deleted();
        info!("Deleted account at index {}", index);
    }

    pub fn clear_all_accounts(&self) {
        let removed: Vec<_> = self.lock().drain(..).collect();
        for account in &removed {
            account.mark_deleted();
        }
        info!("Cleared {} accounts", removed.len());
    }

    fn register(&self, identity: LedgerIdentity) -> Arc<AccountHandle> {
        let address = identity.address().clone();
        let account = Arc::new(AccountHandle::new(identity, self.collaborators.clone()));
        self.lock().push(Arc::clone(&account));
        info!("Added account {}", address);
        account
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<AccountHandle>>> {
        // A plain Vec has no invariant a panicking holder could break
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }
}
