//! Helpers shared by integration tests, benches and fuzz targets.

use crate::domain::{Amm, Registry, Vault};
use crate::kernel::Kernel;
use crate::primitives::{Address, AddressBytes};
use crate::token::{FungibleLedger, MemoryToken, TokenError};
use crate::types::Amount;

pub const POOL: Address = AddressBytes::repeat(0xc3);
pub const VAULT: Address = AddressBytes::repeat(0xd4);

/// Installs a `fmt` subscriber filtered by `RUST_LOG`. Safe to call from
/// every test; only the first call takes effect.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mints `amount` to each holder and lets every spender pull all of it.
pub fn funded_token(
    symbol: &str,
    holders: &[Address],
    amount: Amount,
    spenders: &[Address],
) -> Result<MemoryToken, TokenError> {
    let token = MemoryToken::new(symbol);
    for holder in holders {
        token.mint(holder, amount)?;
        for spender in spenders {
            token.approve(holder, spender, Amount::MAX)?;
        }
    }
    Ok(token)
}

/// A kernel over fresh X and Y tokens; the vault custodies X.
#[derive(Debug)]
pub struct TestKernel {
    pub kernel: Kernel<MemoryToken>,
    pub x: MemoryToken,
    pub y: MemoryToken,
}

impl TestKernel {
    pub fn new(holders: &[Address], amount: Amount) -> Result<Self, TokenError> {
        let x = funded_token("X", holders, amount, &[POOL, VAULT])?;
        let y = funded_token("Y", holders, amount, &[POOL])?;
        let amm = Amm::new(POOL, x.clone(), y.clone());
        let vault = Vault::new(VAULT, x.clone());
        Ok(TestKernel { kernel: Kernel::new(amm, vault, Registry::new()), x, y })
    }

    /// X and Y balances of `owner`.
    pub fn holdings(&self, owner: &Address) -> Result<(Amount, Amount), TokenError> {
        Ok((self.x.balance_of(owner)?, self.y.balance_of(owner)?))
    }
}
