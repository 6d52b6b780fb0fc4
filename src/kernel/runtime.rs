//! Kernel dispatch abstraction.
//!
//! A `Contract` is a component the kernel can route a decoded call to. Keeping
//! the routing behind a trait lets the kernel stay generic over the concrete
//! ledgers it drives, while each component keeps its typed public API.

use crate::domain::{Amm, Registry, Vault};
use crate::error::LedgerError;
use crate::events::EventSink;
use crate::primitives::{Address, Event};
use crate::token::FungibleLedger;
use crate::types::{Amount, Shares};

/// Trait implemented by every component the kernel drives.
///
/// `execute` must leave the component untouched when it returns an error.
pub trait Contract {
    type Call;

    fn execute(&mut self, caller: Address, call: &Self::Call) -> Result<Event, LedgerError>;
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmmCall {
    Init { x: Amount, y: Amount },
    Mint { x: Amount, y: Amount },
    Burn {
        #[serde(with = "crate::math::decimal")]
        shares: Shares,
    },
    SellX { x_in: Amount },
    SellY { y_in: Amount },
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultCall {
    Deposit { amount: Amount },
    Withdraw { amount: Amount },
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryCall {
    Claim { name: String },
    Release { name: String },
}

impl<L: FungibleLedger, S: EventSink> Contract for Amm<L, S> {
    type Call = AmmCall;

    fn execute(&mut self, caller: Address, call: &AmmCall) -> Result<Event, LedgerError> {
        match *call {
            AmmCall::Init { x, y } => self.init(caller, x, y),
            AmmCall::Mint { x, y } => self.mint(caller, x, y),
            AmmCall::Burn { shares } => self.burn(caller, shares),
            AmmCall::SellX { x_in } => self.sell_x(caller, x_in),
            AmmCall::SellY { y_in } => self.sell_y(caller, y_in),
        }
    }
}

impl<L: FungibleLedger, S: EventSink> Contract for Vault<L, S> {
    type Call = VaultCall;

    fn execute(&mut self, caller: Address, call: &VaultCall) -> Result<Event, LedgerError> {
        match *call {
            VaultCall::Deposit { amount } => self.deposit(caller, amount),
            VaultCall::Withdraw { amount } => self.withdraw(caller, amount),
        }
    }
}

impl<S: EventSink> Contract for Registry<S> {
    type Call = RegistryCall;

    fn execute(&mut self, caller: Address, call: &RegistryCall) -> Result<Event, LedgerError> {
        match call {
            RegistryCall::Claim { name } => self.claim(caller, name),
            RegistryCall::Release { name } => self.release(caller, name),
        }
    }
}
