use thiserror::Error;

use crate::types::Address;

pub type Result<T> = std::result::Result<T, AccountError>;

/// Errors surfaced by an account handle.
///
/// Only `AccountDeleted` originates in the handle itself; the other two are
/// passed through from the collaborator that did the work.
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Account deleted, create or get another account")]
    AccountDeleted,
    #[error("Operation failed: {0}")]
    OperationFailed(#[from] OperationFailure),
    #[error("Wrong passphrase, could not unlock account key")]
    Passphrase,
}

/// Ledger or network level failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationFailure {
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Account {0} not found")]
    AccountNotFound(Address),
    #[error("Account {0} is not activated")]
    AccountNotActivated(Address),
    #[error("Account {0} is already activated")]
    AlreadyActivated(Address),
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request interrupted: {0}")]
    Interrupted(String),
}

impl AccountError {
    pub fn is_account_deleted(&self) -> bool {
        matches!(self, AccountError::AccountDeleted)
    }

    pub fn is_passphrase(&self) -> bool {
        matches!(self, AccountError::Passphrase)
    }

    /// The collaborator's classification, if this is an operation failure
    pub fn failure(&self) -> Option<&OperationFailure> {
        match self {
            AccountError::OperationFailed(f) => Some(f),
            _ => None,
        }
    }
}
