//! Recording fakes for the collaborator traits

use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::collaborators::{
    AccountActivator, BalanceReader, Collaborators, PaymentWatcher, TransactionDispatcher,
    WatcherFactory,
};
use crate::error::{OperationFailure, Result};
use crate::identity::LedgerIdentity;
use crate::types::{Address, Balance, PaymentInfo, TransactionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Submit {
        source: Address,
        destination: Address,
        amount: Decimal,
        memo: Option<String>,
        with_memo: bool,
    },
    Read { address: Address },
    Activate { address: Address },
    Watch { address: Address },
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    balance: Decimal,
    next_tx: Option<String>,
    submitted: Vec<TransactionId>,
    activated: bool,
    fail_next: Option<OperationFailure>,
}

pub struct FakeLedger {
    state: Mutex<State>,
    feed: broadcast::Sender<PaymentInfo>,
}

impl FakeLedger {
    pub fn new() -> Arc<Self> {
        let (feed, _) = broadcast::channel(16);
        Arc::new(Self {
            state: Mutex::new(State::default()),
            feed,
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn submitted(&self) -> Vec<TransactionId> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn is_activated(&self) -> bool {
        self.state.lock().unwrap().activated
    }

    pub fn set_balance(&self, balance: Decimal) {
        self.state.lock().unwrap().balance = balance;
    }

    pub fn set_next_tx(&self, id: &str) {
        self.state.lock().unwrap().next_tx = Some(id.to_string());
    }

    pub fn fail_next(&self, failure: OperationFailure) {
        self.state.lock().unwrap().fail_next = Some(failure);
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.fail_next.take() {
            Some(failure) => Err(failure.into()),
            None => Ok(()),
        }
    }

    fn dispatch(
        &self,
        call: Call,
        identity: &LedgerIdentity,
        passphrase: &str,
    ) -> Result<TransactionId> {
        self.record(call)?;
        identity.unlock(passphrase)?;

        let mut state = self.state.lock().unwrap();
        let id = state
            .next_tx
            .take()
            .unwrap_or_else(|| format!("tx{}", state.submitted.len() + 1));
        let id = TransactionId::new(id);
        state.submitted.push(id.clone());
        Ok(id)
    }
}

pub fn fake_collaborators(ledger: &Arc<FakeLedger>) -> Collaborators {
    Collaborators::from_single(Arc::clone(ledger))
}

impl TransactionDispatcher for FakeLedger {
    fn submit(
        &self,
        identity: &LedgerIdentity,
        passphrase: &str,
        destination: &Address,
        amount: Decimal,
    ) -> Result<TransactionId> {
        let call = Call::Submit {
            source: identity.address().clone(),
            destination: destination.clone(),
            amount,
            memo: None,
            with_memo: false,
        };
        self.dispatch(call, identity, passphrase)
    }

    fn submit_with_memo(
        &self,
        identity: &LedgerIdentity,
        passphrase: &str,
        destination: &Address,
        amount: Decimal,
        memo: Option<&str>,
    ) -> Result<TransactionId> {
        let call = Call::Submit {
            source: identity.address().clone(),
            destination: destination.clone(),
            amount,
            memo: memo.map(str::to_string),
            with_memo: true,
        };
        self.dispatch(call, identity, passphrase)
    }
}

impl BalanceReader for FakeLedger {
    fn read(&self, identity: &LedgerIdentity) -> Result<Balance> {
        self.record(Call::Read {
            address: identity.address().clone(),
        })?;
        Ok(Balance::new(self.state.lock().unwrap().balance))
    }
}

impl AccountActivator for FakeLedger {
    fn activate(&self, identity: &LedgerIdentity, passphrase: &str) -> Result<()> {
        self.record(Call::Activate {
            address: identity.address().clone(),
        })?;
        identity.unlock(passphrase)?;
        self.state.lock().unwrap().activated = true;
        Ok(())
    }
}

impl WatcherFactory for FakeLedger {
    fn create(&self, identity: &LedgerIdentity) -> PaymentWatcher {
        // Watcher creation cannot fail, so a queued failure is left for the next call
        self.state.lock().unwrap().calls.push(Call::Watch {
            address: identity.address().clone(),
        });
        PaymentWatcher::new(identity.address().clone(), self.feed.subscribe())
    }
}
