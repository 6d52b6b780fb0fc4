pub mod core;
pub mod runtime;

#[cfg(test)]
mod tests;

pub use self::core::{Call, Command, Kernel, Receipt, SystemState};
pub use self::runtime::{AmmCall, Contract, RegistryCall, VaultCall};
