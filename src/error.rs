//!
//! Defines error types for the AMM pool, the vault and the registry.

use crate::token::TokenError;
use crate::types::Asset;

/// Represents the reasons a public ledger operation can be rejected.
///
/// Apart from [`LedgerError::CompensationFailed`], every variant leaves pool,
/// vault, registry and token balances as they were before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// `init` was called on a pool that already holds liquidity.
    #[error("pool already initialized")]
    AlreadyInitialized,
    /// A liquidity operation was attempted before `init`.
    #[error("pool not initialized")]
    NotInitialized,
    /// The deposited amounts are not in the exact ratio of the current reserves.
    #[error("ratio of deposited amounts does not match pool reserves")]
    RatioMismatch,
    /// The pool cannot pay out of this reserve, or the operation would drain
    /// it to zero.
    #[error("not enough {0} reserves")]
    InsufficientReserves(Asset),
    /// The caller does not hold enough liquidity shares.
    #[error("insufficient liquidity shares")]
    InsufficientShares,
    /// The caller asked to withdraw more than they have deposited.
    #[error("amount greater than vault balance")]
    InsufficientVaultBalance,
    /// The caller has not approved, or does not hold, enough of the asset.
    #[error("insufficient token allowance or balance")]
    InsufficientAllowanceOrBalance,
    /// The name already has an owner.
    #[error("name already claimed")]
    NameAlreadyClaimed,
    /// The caller is not the current owner of the name.
    #[error("not owner")]
    NotOwner,
    /// A fixed-point computation overflowed or divided by zero.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    /// A supplied or computed quantity that must be positive is zero.
    #[error("amount must be greater than zero")]
    ZeroAmount,
    /// A swap or burn would pay out nothing after truncation.
    #[error("output rounds down to zero")]
    InsufficientOutput,
    /// An outbound transfer failed and returning what had already moved failed
    /// too. Pool state records the transfers that did happen, so reserves never
    /// exceed what the pool holds; the caller's assets may be left short.
    #[error("failed to undo partial transfer: {0}")]
    CompensationFailed(TokenError),
    /// A restored snapshot violates a ledger invariant.
    #[error("invalid ledger state: {0}")]
    InvalidState(String),
    /// The underlying asset ledger failed for a reason other than a shortfall.
    #[error("token ledger error: {0}")]
    Token(TokenError),
}

impl From<TokenError> for LedgerError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InsufficientBalance | TokenError::InsufficientAllowance => {
                LedgerError::InsufficientAllowanceOrBalance
            }
            other => LedgerError::Token(other),
        }
    }
}
