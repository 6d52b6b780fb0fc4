//! Constant-product AMM pool with proportional liquidity shares.
//!
//! Every public operation follows the same order:
//!
//! 1. validate preconditions and compute every derived value;
//! 2. pull inbound assets from the caller (after checking both legs can move);
//! 3. commit pool state;
//! 4. push outbound assets, rolling the commit back if the push fails;
//! 5. emit exactly one event.
//!
//! When a push fails, whatever already moved is sent back. If that also fails
//! the call returns [`LedgerError::CompensationFailed`] and the pool keeps only
//! the state changes matching transfers that really happened, so recorded
//! reserves never exceed the balances the pool holds.
//!
//! Mutating methods take `&mut self`, so the pool cannot be re-entered from a
//! ledger callback while one of its operations is in flight.

use std::collections::BTreeMap;

use crate::config::{ConfigError, PoolConfig};
use crate::error::LedgerError;
use crate::events::{EventLog, EventSink};
use crate::math;
use crate::primitives::{Address, Event};
use crate::token::{ensure_pullable, FungibleLedger};
use crate::token::TokenError;
use crate::types::{Amount, Asset, FirstMintPolicy, Shares};

/// Serializable pool state.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolState {
    pub x_reserves: Amount,
    pub y_reserves: Amount,
    #[serde(with = "crate::math::decimal")]
    pub total_shares: Shares,
    /// Owners with a zero balance are not stored.
    #[serde(with = "crate::math::decimal::map")]
    pub share_balances: BTreeMap<Address, Shares>,
    pub initialized: bool,
}

impl PoolState {
    /// Checks the pool invariants, returning a description of the first one
    /// that does not hold.
    pub fn check_invariants(&self) -> Result<(), String> {
        if !self.initialized {
            if self.x_reserves != 0 || self.y_reserves != 0 || !self.total_shares.is_zero() {
                return Err("uninitialized pool holds reserves or shares".into());
            }
        } else if self.x_reserves == 0 || self.y_reserves == 0 {
            return Err(format!(
                "initialized pool drained: x={} y={}",
                self.x_reserves, self.y_reserves
            ));
        }
        let mut sum = Shares::zero();
        for (owner, balance) in &self.share_balances {
            if balance.is_zero() {
                return Err(format!("zero share balance stored for {}", owner));
            }
            sum = math::add_shares(sum, *balance).map_err(|_| "share balances overflow".to_string())?;
        }
        if sum != self.total_shares {
            return Err(format!(
                "share balances sum to {} but total shares is {}",
                sum, self.total_shares
            ));
        }
        Ok(())
    }
}

/// Outcome of a swap computed without touching the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub new_x_reserves: Amount,
    pub new_y_reserves: Amount,
}

/// Outcome of a burn computed without touching the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnQuote {
    pub shares: Shares,
    pub x_out: Amount,
    pub y_out: Amount,
}

/// Pool values captured before a commit that is followed by an outbound push.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    x_reserves: Amount,
    y_reserves: Amount,
    total_shares: Shares,
    owner: Address,
    owner_shares: Shares,
}

/// `new_out = reserve_in * reserve_out / (reserve_in + amount_in)`,
/// `out = reserve_out - new_out`.
fn constant_product_out(
    reserve_in: Amount,
    reserve_out: Amount,
    amount_in: Amount,
    asset_out: Asset,
) -> Result<(Amount, Amount, Amount), LedgerError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(LedgerError::InsufficientReserves(asset_out));
    }
    if amount_in == 0 {
        return Err(LedgerError::ZeroAmount);
    }
    let new_in = math::add(reserve_in, amount_in)?;
    let new_out = math::mul_div(reserve_in, reserve_out, new_in)?;
    if new_out == 0 {
        return Err(LedgerError::InsufficientReserves(asset_out));
    }
    // new_in > reserve_in, so new_out <= reserve_out and this cannot underflow.
    let out = math::sub(reserve_out, new_out)?;
    if out == 0 {
        return Err(LedgerError::InsufficientOutput);
    }
    Ok((new_in, new_out, out))
}

/// Two-asset constant-product pool.
#[derive(Debug)]
pub struct Amm<L: FungibleLedger, S: EventSink = EventLog> {
    /// Identity under which the pool custodies its reserves.
    address: Address,
    config: PoolConfig,
    scale: Amount,
    x_token: L,
    y_token: L,
    state: PoolState,
    sink: S,
}

impl<L: FungibleLedger> Amm<L, EventLog> {
    /// Creates an empty pool with the default configuration.
    pub fn new(address: Address, x_token: L, y_token: L) -> Self {
        Amm {
            address,
            config: PoolConfig::default(),
            scale: crate::types::ONE,
            x_token,
            y_token,
            state: PoolState::default(),
            sink: EventLog::new(),
        }
    }

    pub fn with_config(
        address: Address,
        x_token: L,
        y_token: L,
        config: PoolConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_sink(address, x_token, y_token, config, EventLog::new())
    }

    pub fn events(&self) -> &[Event] {
        self.sink.events()
    }
}

impl<L: FungibleLedger, S: EventSink> Amm<L, S> {
    pub fn with_sink(
        address: Address,
        x_token: L,
        y_token: L,
        config: PoolConfig,
        sink: S,
    ) -> Result<Self, ConfigError> {
        let scale = config.scale()?;
        Ok(Amm {
            address,
            config,
            scale,
            x_token,
            y_token,
            state: PoolState::default(),
            sink,
        })
    }

    /// Rebuilds a pool from a previously captured state.
    pub fn restore(mut self, state: PoolState) -> Result<Self, LedgerError> {
        state.check_invariants().map_err(|reason| {
            tracing::warn!(%reason, "refusing to restore pool state");
            LedgerError::InvalidState(reason)
        })?;
        self.state = state;
        Ok(self)
    }

    // ---- queries ----------------------------------------------------------

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn x_reserves(&self) -> Amount {
        self.state.x_reserves
    }

    pub fn y_reserves(&self) -> Amount {
        self.state.y_reserves
    }

    pub fn total_shares(&self) -> Shares {
        self.state.total_shares
    }

    pub fn share_balance_of(&self, owner: &Address) -> Shares {
        self.state.share_balances.get(owner).copied().unwrap_or_default()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    pub fn state(&self) -> &PoolState {
        &self.state
    }

    pub fn x_token(&self) -> &L {
        &self.x_token
    }

    pub fn y_token(&self) -> &L {
        &self.y_token
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// True when the pool holds at least its recorded reserves in both tokens.
    pub fn is_solvent(&self) -> Result<bool, LedgerError> {
        Ok(self.state.x_reserves <= self.x_token.balance_of(&self.address)?
            && self.state.y_reserves <= self.y_token.balance_of(&self.address)?)
    }

    /// Shares the first deposit of `(x, y)` would mint under the configured policy.
    pub fn quote_init(&self, x: Amount, y: Amount) -> Result<Shares, LedgerError> {
        if x == 0 || y == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let product = math::wide_mul(x, y);
        let shares = match self.config.first_mint {
            FirstMintPolicy::Product => product,
            FirstMintPolicy::ScaledProduct => product / Shares::from(self.scale),
        };
        if shares.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        Ok(shares)
    }

    /// Shares a proportional deposit of `(x, y)` would mint.
    pub fn quote_mint(&self, x: Amount, y: Amount) -> Result<Shares, LedgerError> {
        if !self.state.initialized {
            return Err(LedgerError::NotInitialized);
        }
        if x == 0 || y == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let (x_res, y_res) = (self.state.x_reserves, self.state.y_reserves);
        if math::mul_cmp(x, y_res, y, x_res) != std::cmp::Ordering::Equal {
            return Err(LedgerError::RatioMismatch);
        }
        let shares = math::mul_div_shares(x, self.state.total_shares, x_res)?;
        if shares.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        Ok(shares)
    }

    /// Reserves paid out for burning `shares`. Does not check who holds them.
    pub fn quote_burn(&self, shares: Shares) -> Result<BurnQuote, LedgerError> {
        if !self.state.initialized {
            return Err(LedgerError::NotInitialized);
        }
        if shares.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if shares > self.state.total_shares {
            return Err(LedgerError::InsufficientShares);
        }
        let total = self.state.total_shares;
        let x_out = math::mul_div_by_shares(self.state.x_reserves, shares, total)?;
        let y_out = math::mul_div_by_shares(self.state.y_reserves, shares, total)?;
        if x_out >= self.state.x_reserves {
            return Err(LedgerError::InsufficientReserves(Asset::X));
        }
        if y_out >= self.state.y_reserves {
            return Err(LedgerError::InsufficientReserves(Asset::Y));
        }
        if x_out == 0 && y_out == 0 {
            return Err(LedgerError::InsufficientOutput);
        }
        Ok(BurnQuote { shares, x_out, y_out })
    }

    pub fn quote_sell_x(&self, x_in: Amount) -> Result<SwapQuote, LedgerError> {
        let (new_x, new_y, y_out) =
            constant_product_out(self.state.x_reserves, self.state.y_reserves, x_in, Asset::Y)?;
        Ok(SwapQuote {
            amount_in: x_in,
            amount_out: y_out,
            new_x_reserves: new_x,
            new_y_reserves: new_y,
        })
    }

    pub fn quote_sell_y(&self, y_in: Amount) -> Result<SwapQuote, LedgerError> {
        let (new_y, new_x, x_out) =
            constant_product_out(self.state.y_reserves, self.state.x_reserves, y_in, Asset::X)?;
        Ok(SwapQuote {
            amount_in: y_in,
            amount_out: x_out,
            new_x_reserves: new_x,
            new_y_reserves: new_y,
        })
    }

    // ---- operations -------------------------------------------------------

    /// Seeds the pool with its first liquidity.
    pub fn init(&mut self, caller: Address, x: Amount, y: Amount) -> Result<Event, LedgerError> {
        self.init_inner(caller, x, y)
            .map_err(|err| Self::rejected("init", caller, err))
    }

    /// Adds liquidity in the exact ratio of the current reserves.
    pub fn mint(&mut self, caller: Address, x: Amount, y: Amount) -> Result<Event, LedgerError> {
        self.mint_inner(caller, x, y)
            .map_err(|err| Self::rejected("mint", caller, err))
    }

    /// Redeems `shares` for the proportional slice of both reserves.
    pub fn burn(&mut self, caller: Address, shares: Shares) -> Result<Event, LedgerError> {
        self.burn_inner(caller, shares)
            .map_err(|err| Self::rejected("burn", caller, err))
    }

    /// Sells `x_in` of asset X for asset Y.
    pub fn sell_x(&mut self, caller: Address, x_in: Amount) -> Result<Event, LedgerError> {
        self.sell_x_inner(caller, x_in)
            .map_err(|err| Self::rejected("sell_x", caller, err))
    }

    /// Sells `y_in` of asset Y for asset X.
    pub fn sell_y(&mut self, caller: Address, y_in: Amount) -> Result<Event, LedgerError> {
        self.sell_y_inner(caller, y_in)
            .map_err(|err| Self::rejected("sell_y", caller, err))
    }

    fn init_inner(&mut self, caller: Address, x: Amount, y: Amount) -> Result<Event, LedgerError> {
        if self.state.initialized {
            return Err(LedgerError::AlreadyInitialized);
        }
        let shares = self.quote_init(x, y)?;
        tracing::debug!(%caller, x, y, %shares, "init computed");

        self.pull_both(&caller, x, y)?;

        self.state.x_reserves = x;
        self.state.y_reserves = y;
        self.state.total_shares = shares;
        self.state.share_balances.insert(caller, shares);
        self.state.initialized = true;

        tracing::info!(pool = %self.address, %caller, x, y, %shares, "pool initialized");
        Ok(self.emit(Event::Liquidity { provider: caller, x, y, shares }))
    }

    fn mint_inner(&mut self, caller: Address, x: Amount, y: Amount) -> Result<Event, LedgerError> {
        let shares = self.quote_mint(x, y)?;
        let new_x = math::add(self.state.x_reserves, x)?;
        let new_y = math::add(self.state.y_reserves, y)?;
        let new_total = math::add_shares(self.state.total_shares, shares)?;
        let new_balance = math::add_shares(self.share_balance_of(&caller), shares)?;
        tracing::debug!(%caller, x, y, %shares, "mint computed");

        self.pull_both(&caller, x, y)?;

        self.state.x_reserves = new_x;
        self.state.y_reserves = new_y;
        self.state.total_shares = new_total;
        self.state.share_balances.insert(caller, new_balance);

        tracing::info!(pool = %self.address, %caller, x, y, %shares, "liquidity minted");
        Ok(self.emit(Event::Liquidity { provider: caller, x, y, shares }))
    }

    fn burn_inner(&mut self, caller: Address, shares: Shares) -> Result<Event, LedgerError> {
        if !self.state.initialized {
            return Err(LedgerError::NotInitialized);
        }
        if shares.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        let held = self.share_balance_of(&caller);
        if held < shares {
            return Err(LedgerError::InsufficientShares);
        }
        let BurnQuote { x_out, y_out, .. } = self.quote_burn(shares)?;
        let new_total = math::sub_shares(self.state.total_shares, shares)?;
        let new_held = math::sub_shares(held, shares)?;
        self.ensure_payable(&self.x_token, Asset::X, x_out)?;
        self.ensure_payable(&self.y_token, Asset::Y, y_out)?;
        tracing::debug!(%caller, %shares, x_out, y_out, "burn computed");

        let checkpoint = self.checkpoint(caller);
        self.state.x_reserves -= x_out;
        self.state.y_reserves -= y_out;
        self.state.total_shares = new_total;
        self.set_shares(caller, new_held);

        if let Err(err) = self.x_token.transfer(&self.address, &caller, x_out) {
            self.rollback(checkpoint);
            return Err(err.into());
        }
        if let Err(err) = self.y_token.transfer(&self.address, &caller, y_out) {
            if let Err(reclaim_err) = self.reclaim(&self.x_token, &caller, x_out) {
                // X has left the pool for good: the burn stands on that leg and
                // the unpaid Y stays in the reserves.
                self.state.y_reserves = checkpoint.y_reserves;
                return Err(LedgerError::CompensationFailed(reclaim_err));
            }
            self.rollback(checkpoint);
            return Err(err.into());
        }

        tracing::info!(pool = %self.address, %caller, %shares, x_out, y_out, "liquidity burned");
        Ok(self.emit(Event::Burn { provider: caller, shares, x: x_out, y: y_out }))
    }

    fn sell_x_inner(&mut self, caller: Address, x_in: Amount) -> Result<Event, LedgerError> {
        let quote = self.quote_sell_x(x_in)?;
        let y_out = quote.amount_out;
        tracing::debug!(%caller, x_in, y_out, new_x = quote.new_x_reserves, new_y = quote.new_y_reserves, "sell_x computed");

        ensure_pullable(&self.x_token, &self.address, &caller, x_in)?;
        self.ensure_payable(&self.y_token, Asset::Y, y_out)?;
        self.x_token.transfer_from(&self.address, &caller, &self.address, x_in)?;

        let checkpoint = self.checkpoint(caller);
        self.state.x_reserves = quote.new_x_reserves;
        self.state.y_reserves = quote.new_y_reserves;

        if let Err(err) = self.y_token.transfer(&self.address, &caller, y_out) {
            self.rollback(checkpoint);
            self.refund(&self.x_token, &caller, x_in)
                .map_err(LedgerError::CompensationFailed)?;
            return Err(err.into());
        }

        tracing::info!(pool = %self.address, %caller, x_in, y_out, "sold x");
        Ok(self.emit(Event::SellX { seller: caller, x_in, y_out }))
    }

    fn sell_y_inner(&mut self, caller: Address, y_in: Amount) -> Result<Event, LedgerError> {
        let quote = self.quote_sell_y(y_in)?;
        let x_out = quote.amount_out;
        tracing::debug!(%caller, y_in, x_out, new_x = quote.new_x_reserves, new_y = quote.new_y_reserves, "sell_y computed");

        ensure_pullable(&self.y_token, &self.address, &caller, y_in)?;
        self.ensure_payable(&self.x_token, Asset::X, x_out)?;
        self.y_token.transfer_from(&self.address, &caller, &self.address, y_in)?;

        let checkpoint = self.checkpoint(caller);
        self.state.x_reserves = quote.new_x_reserves;
        self.state.y_reserves = quote.new_y_reserves;

        if let Err(err) = self.x_token.transfer(&self.address, &caller, x_out) {
            self.rollback(checkpoint);
            self.refund(&self.y_token, &caller, y_in)
                .map_err(LedgerError::CompensationFailed)?;
            return Err(err.into());
        }

        tracing::info!(pool = %self.address, %caller, y_in, x_out, "sold y");
        Ok(self.emit(Event::SellY { seller: caller, y_in, x_out }))
    }

    // ---- helpers ----------------------------------------------------------

    /// Pulls both deposit legs, or neither.
    fn pull_both(&self, caller: &Address, x: Amount, y: Amount) -> Result<(), LedgerError> {
        ensure_pullable(&self.x_token, &self.address, caller, x)?;
        ensure_pullable(&self.y_token, &self.address, caller, y)?;
        self.x_token.transfer_from(&self.address, caller, &self.address, x)?;
        if let Err(err) = self.y_token.transfer_from(&self.address, caller, &self.address, y) {
            // Nothing is committed yet; an unreturned X leg is unaccounted surplus.
            self.refund(&self.x_token, caller, x)
                .map_err(LedgerError::CompensationFailed)?;
            return Err(err.into());
        }
        Ok(())
    }

    fn ensure_payable(&self, token: &L, asset: Asset, amount: Amount) -> Result<(), LedgerError> {
        if token.balance_of(&self.address)? < amount {
            return Err(LedgerError::InsufficientReserves(asset));
        }
        Ok(())
    }

    /// Returns an already-pulled leg to the caller.
    fn refund(&self, token: &L, caller: &Address, amount: Amount) -> Result<(), TokenError> {
        token.transfer(&self.address, caller, amount).map_err(|err| {
            tracing::error!(pool = %self.address, %caller, amount, error = %err, "refund failed");
            err
        })
    }

    /// Pulls back an already-paid leg, on whatever allowance the caller left
    /// the pool.
    fn reclaim(&self, token: &L, caller: &Address, amount: Amount) -> Result<(), TokenError> {
        token
            .transfer_from(&self.address, caller, &self.address, amount)
            .map_err(|err| {
                tracing::error!(pool = %self.address, %caller, amount, error = %err, "reclaim failed");
                err
            })
    }

    fn checkpoint(&self, owner: Address) -> Checkpoint {
        Checkpoint {
            x_reserves: self.state.x_reserves,
            y_reserves: self.state.y_reserves,
            total_shares: self.state.total_shares,
            owner,
            owner_shares: self.share_balance_of(&owner),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.state.x_reserves = checkpoint.x_reserves;
        self.state.y_reserves = checkpoint.y_reserves;
        self.state.total_shares = checkpoint.total_shares;
        self.set_shares(checkpoint.owner, checkpoint.owner_shares);
    }

    fn set_shares(&mut self, owner: Address, shares: Shares) {
        if shares.is_zero() {
            self.state.share_balances.remove(&owner);
        } else {
            self.state.share_balances.insert(owner, shares);
        }
    }

    fn emit(&mut self, event: Event) -> Event {
        self.sink.emit(event.clone());
        event
    }

    fn rejected(op: &'static str, caller: Address, err: LedgerError) -> LedgerError {
        tracing::warn!(op, %caller, error = %err, "pool call rejected");
        err
    }
}
