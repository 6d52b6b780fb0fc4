//! Ledger components: the AMM pool, the custody vault and the name registry.

pub mod amm;
pub mod registry;
pub mod vault;

pub use amm::{Amm, BurnQuote, PoolState, SwapQuote};
pub use registry::{Registry, RegistryState};
pub use vault::{Vault, VaultState};
