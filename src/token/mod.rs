//!
//! Fungible asset ledger abstraction.
//!
//! The pool and the vault never own the assets they account for; they move
//! them through a [`FungibleLedger`] supplied by the surrounding environment.
//! This keeps the components independent of any concrete token
//! implementation, in the same way signature checks are kept behind a provider
//! trait.

use crate::primitives::Address;
use crate::types::Amount;

/// Errors that can occur inside a fungible asset ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("insufficient token balance")]
    InsufficientBalance,
    #[error("insufficient token allowance")]
    InsufficientAllowance,
    #[error("token balance overflow")]
    Overflow,
    #[error("token ledger is unavailable")]
    Unavailable,
}

/// Asset-transfer capability consumed by the pool and the vault.
///
/// Every mutating method is atomic: it either fully succeeds or returns an
/// error having changed nothing.
pub trait FungibleLedger: Send + Sync + std::fmt::Debug {
    /// Current balance of `owner`.
    fn balance_of(&self, owner: &Address) -> Result<Amount, TokenError>;

    /// Amount `spender` may still pull from `owner`.
    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount, TokenError>;

    /// Sets the allowance of `spender` over `owner`'s balance.
    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<(), TokenError>;

    /// Moves `amount` from `from` to `to` on `from`'s own authority.
    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;

    /// Moves `amount` from `from` to `to` on the authority of `spender`,
    /// consuming `spender`'s allowance.
    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;
}

/// Checks that `spender` could pull `amount` from `owner` right now.
///
/// Used to validate every inbound leg of an operation before the first transfer
/// is attempted.
pub fn ensure_pullable<L: FungibleLedger + ?Sized>(
    ledger: &L,
    spender: &Address,
    owner: &Address,
    amount: Amount,
) -> Result<(), TokenError> {
    if ledger.allowance(owner, spender)? < amount {
        return Err(TokenError::InsufficientAllowance);
    }
    if ledger.balance_of(owner)? < amount {
        return Err(TokenError::InsufficientBalance);
    }
    Ok(())
}

pub mod memory;

pub use memory::MemoryToken;
