//! In-memory fungible token.
//!
//! `MemoryToken` is a handle: clones share the same balances, the way several
//! contracts refer to one deployed token by address. It backs the kernel, the
//! tests, the benches and the fuzz targets.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{FungibleLedger, TokenError};
use crate::primitives::Address;
use crate::types::Amount;

#[derive(Debug, Default)]
struct TokenBook {
    balances: HashMap<Address, Amount>,
    /// owner -> spender -> remaining allowance
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    total_supply: Amount,
}

impl TokenBook {
    fn balance(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn set_balance(&mut self, owner: &Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(owner);
        } else {
            self.balances.insert(*owner, amount);
        }
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let from_balance = self.balance(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance);
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.set_balance(from, from_balance - amount);
        self.set_balance(to, to_balance);
        Ok(())
    }
}

/// Shared in-memory ledger for a single asset.
#[derive(Debug, Clone, Default)]
pub struct MemoryToken {
    symbol: String,
    book: Arc<Mutex<TokenBook>>,
}

impl MemoryToken {
    pub fn new(symbol: impl Into<String>) -> Self {
        MemoryToken {
            symbol: symbol.into(),
            book: Arc::new(Mutex::new(TokenBook::default())),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn book(&self) -> Result<MutexGuard<'_, TokenBook>, TokenError> {
        self.book.lock().map_err(|_| TokenError::Unavailable)
    }

    /// Creates `amount` new units owned by `to`.
    pub fn mint(&self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let mut book = self.book()?;
        let supply = book.total_supply.checked_add(amount).ok_or(TokenError::Overflow)?;
        let balance = book.balance(to).checked_add(amount).ok_or(TokenError::Overflow)?;
        book.total_supply = supply;
        book.set_balance(to, balance);
        tracing::debug!(token = %self.symbol, %to, amount, "minted");
        Ok(())
    }

    pub fn total_supply(&self) -> Result<Amount, TokenError> {
        Ok(self.book()?.total_supply)
    }
}

impl FungibleLedger for MemoryToken {
    fn balance_of(&self, owner: &Address) -> Result<Amount, TokenError> {
        Ok(self.book()?.balance(owner))
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount, TokenError> {
        Ok(self.book()?.allowance(owner, spender))
    }

    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<(), TokenError> {
        self.book()?
            .allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
        Ok(())
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        self.book()?.move_balance(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let mut book = self.book()?;
        let allowance = book.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance);
        }
        book.move_balance(from, to, amount)?;
        // Only consume the allowance once the move is known to have succeeded.
        book.allowances
            .entry(*from)
            .or_default()
            .insert(*spender, allowance - amount);
        Ok(())
    }
}
