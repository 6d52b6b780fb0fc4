//!
//! Command processing for the pool, vault and registry.
//!
//! The kernel owns one of each component and applies [`Command`]s to them
//! strictly one at a time. Each committed command receives the next sequence
//! number and is recorded as a [`Receipt`] in an append-only journal; rejected
//! commands leave both the components and the journal untouched.

use crate::domain::{Amm, PoolState, Registry, RegistryState, Vault, VaultState};
use crate::error::LedgerError;
use crate::kernel::runtime::{AmmCall, Contract, RegistryCall, VaultCall};
use crate::primitives::{Address, Event};
use crate::token::FungibleLedger;

/// Call routed to one of the kernel's components.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    Amm(AmmCall),
    Vault(VaultCall),
    Registry(RegistryCall),
}

/// A call together with the identity it is made under.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Command {
    pub caller: Address,
    pub call: Call,
}

impl Command {
    pub fn new(caller: Address, call: Call) -> Self {
        Command { caller, call }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Journal entry for a committed command.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Receipt {
    pub sequence: u64,
    pub caller: Address,
    pub event: Event,
}

/// Serializable snapshot of everything the kernel owns.
///
/// Token balances live in the external ledgers and are not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SystemState {
    pub pool: PoolState,
    pub vault: VaultState,
    pub registry: RegistryState,
    /// Sequence number of the last committed command, zero if none.
    pub sequence: u64,
    pub receipts: Vec<Receipt>,
}

impl SystemState {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn check_journal(&self) -> Result<(), LedgerError> {
        let mut previous = 0u64;
        for receipt in &self.receipts {
            if receipt.sequence <= previous {
                return Err(LedgerError::InvalidState(format!(
                    "receipt sequence {} does not follow {}",
                    receipt.sequence, previous
                )));
            }
            previous = receipt.sequence;
        }
        if previous > self.sequence {
            return Err(LedgerError::InvalidState(format!(
                "journal reaches sequence {} beyond counter {}",
                previous, self.sequence
            )));
        }
        Ok(())
    }
}

/// Serial command processor over one pool, one vault and one registry.
#[derive(Debug)]
pub struct Kernel<L: FungibleLedger> {
    amm: Amm<L>,
    vault: Vault<L>,
    registry: Registry,
    sequence: u64,
    receipts: Vec<Receipt>,
}

impl<L: FungibleLedger> Kernel<L> {
    pub fn new(amm: Amm<L>, vault: Vault<L>, registry: Registry) -> Self {
        Kernel { amm, vault, registry, sequence: 0, receipts: Vec::new() }
    }

    pub fn amm(&self) -> &Amm<L> {
        &self.amm
    }

    pub fn vault(&self) -> &Vault<L> {
        &self.vault
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Sequence number of the last committed command.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    /// apply(cmd) → Receipt
    pub fn apply(&mut self, command: &Command) -> Result<Receipt, LedgerError> {
        // The counter never wraps; a kernel at the limit stops accepting work.
        let sequence = self
            .sequence
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        tracing::debug!(sequence, caller = %command.caller, call = ?command.call, "applying command");
        let event = match &command.call {
            Call::Amm(call) => self.amm.execute(command.caller, call)?,
            Call::Vault(call) => self.vault.execute(command.caller, call)?,
            Call::Registry(call) => self.registry.execute(command.caller, call)?,
        };

        self.sequence = sequence;
        let receipt = Receipt { sequence, caller: command.caller, event };
        self.receipts.push(receipt.clone());
        tracing::info!(sequence, caller = %command.caller, "command committed");
        Ok(receipt)
    }

    pub fn snapshot(&self) -> SystemState {
        SystemState {
            pool: self.amm.state().clone(),
            vault: self.vault.state().clone(),
            registry: self.registry.state().clone(),
            sequence: self.sequence,
            receipts: self.receipts.clone(),
        }
    }

    /// Rebuilds the kernel's components from a snapshot, keeping their
    /// addresses, token handles and configuration.
    ///
    /// The snapshot must be backed by the token ledgers the kernel already
    /// holds: pool reserves and vault deposits may not exceed the balances
    /// their custodians own.
    pub fn restore(self, state: SystemState) -> Result<Self, LedgerError> {
        state.check_journal()?;
        let Kernel { amm, vault, registry, .. } = self;
        let amm = amm.restore(state.pool)?;
        if !amm.is_solvent()? {
            tracing::warn!(pool = %amm.address(), "refusing snapshot: reserves exceed pool balances");
            return Err(LedgerError::InvalidState(
                "pool reserves exceed the pool's token balances".into(),
            ));
        }
        let vault = vault.restore(state.vault)?;
        if !vault.is_solvent()? {
            tracing::warn!(vault = %vault.address(), "refusing snapshot: deposits exceed vault balance");
            return Err(LedgerError::InvalidState(
                "vault deposits exceed the vault's token balance".into(),
            ));
        }
        Ok(Kernel {
            amm,
            vault,
            registry: registry.restore(state.registry),
            sequence: state.sequence,
            receipts: state.receipts,
        })
    }
}

#[cfg(test)]
impl<L: FungibleLedger> Kernel<L> {
    pub(crate) fn set_sequence_for_test(&mut self, sequence: u64) {
        self.sequence = sequence;
    }
}
