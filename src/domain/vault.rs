//! Single-asset custody vault.
//!
//! A keyed balance ledger: each owner may withdraw at most what they deposited.

use std::collections::BTreeMap;

use crate::error::LedgerError;
use crate::events::{EventLog, EventSink};
use crate::math;
use crate::primitives::{Address, Event};
use crate::token::{ensure_pullable, FungibleLedger};
use crate::types::Amount;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VaultState {
    /// Owners with nothing deposited are not stored.
    pub deposits: BTreeMap<Address, Amount>,
}

impl VaultState {
    pub fn total(&self) -> Result<Amount, LedgerError> {
        self.deposits
            .values()
            .try_fold(0, |acc: Amount, amount| math::add(acc, *amount))
    }
}

#[derive(Debug)]
pub struct Vault<L: FungibleLedger, S: EventSink = EventLog> {
    address: Address,
    token: L,
    state: VaultState,
    sink: S,
}

impl<L: FungibleLedger> Vault<L, EventLog> {
    pub fn new(address: Address, token: L) -> Self {
        Self::with_sink(address, token, EventLog::new())
    }

    pub fn events(&self) -> &[Event] {
        self.sink.events()
    }
}

impl<L: FungibleLedger, S: EventSink> Vault<L, S> {
    pub fn with_sink(address: Address, token: L, sink: S) -> Self {
        Vault { address, token, state: VaultState::default(), sink }
    }

    pub fn restore(mut self, state: VaultState) -> Result<Self, LedgerError> {
        if state.deposits.values().any(|amount| *amount == 0) {
            return Err(LedgerError::InvalidState("zero deposit stored".into()));
        }
        state.total()?;
        self.state = state;
        Ok(self)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn token(&self) -> &L {
        &self.token
    }

    pub fn state(&self) -> &VaultState {
        &self.state
    }

    pub fn deposits(&self, owner: &Address) -> Amount {
        self.state.deposits.get(owner).copied().unwrap_or(0)
    }

    pub fn total_deposits(&self) -> Result<Amount, LedgerError> {
        self.state.total()
    }

    /// True when every deposit is backed by the vault's balance in the token.
    pub fn is_solvent(&self) -> Result<bool, LedgerError> {
        Ok(self.state.total()? <= self.token.balance_of(&self.address)?)
    }

    /// Moves `amount` from the caller into custody and credits them.
    pub fn deposit(&mut self, caller: Address, amount: Amount) -> Result<Event, LedgerError> {
        self.deposit_inner(caller, amount).map_err(|err| {
            tracing::warn!(op = "deposit", %caller, error = %err, "vault call rejected");
            err
        })
    }

    /// Debits the caller and returns `amount` from custody.
    pub fn withdraw(&mut self, caller: Address, amount: Amount) -> Result<Event, LedgerError> {
        self.withdraw_inner(caller, amount).map_err(|err| {
            tracing::warn!(op = "withdraw", %caller, error = %err, "vault call rejected");
            err
        })
    }

    fn deposit_inner(&mut self, caller: Address, amount: Amount) -> Result<Event, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let credited = math::add(self.deposits(&caller), amount)?;
        ensure_pullable(&self.token, &self.address, &caller, amount)?;
        self.token.transfer_from(&self.address, &caller, &self.address, amount)?;

        self.state.deposits.insert(caller, credited);
        tracing::info!(vault = %self.address, %caller, amount, balance = credited, "deposited");
        Ok(self.emit(Event::Deposit { owner: caller, amount }))
    }

    fn withdraw_inner(&mut self, caller: Address, amount: Amount) -> Result<Event, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let held = self.deposits(&caller);
        if held < amount {
            return Err(LedgerError::InsufficientVaultBalance);
        }

        self.set_deposit(caller, held - amount);
        if let Err(err) = self.token.transfer(&self.address, &caller, amount) {
            self.set_deposit(caller, held);
            return Err(err.into());
        }
        tracing::info!(vault = %self.address, %caller, amount, balance = held - amount, "withdrew");
        Ok(self.emit(Event::Withdraw { owner: caller, amount }))
    }

    fn set_deposit(&mut self, owner: Address, amount: Amount) {
        if amount == 0 {
            self.state.deposits.remove(&owner);
        } else {
            self.state.deposits.insert(owner, amount);
        }
    }

    fn emit(&mut self, event: Event) -> Event {
        self.sink.emit(event.clone());
        event
    }
}
