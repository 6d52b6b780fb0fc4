#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! A deterministic ledger core for a constant-product AMM pool, a custody
//! vault and a name registry.
//!
//! The components account for assets they never own: every transfer goes
//! through a [`token::FungibleLedger`] supplied by the environment. Each
//! mutating operation is all-or-nothing and emits exactly one [`Event`].
//! Fixed-point values are `u128` with 18 decimals; intermediate products are
//! computed in 256 bits.

// Shared scalar types and fixed-point constants.
pub mod types;

// Addresses and notification events.
pub mod primitives;

pub use primitives::*;

pub mod error;

pub mod config;

// Checked 256-bit intermediate arithmetic.
pub mod math;

// Fungible asset ledger abstraction and the in-memory ledger.
pub mod token;

pub mod events;

// Pool, vault and registry.
pub mod domain;

// Serial command processing, journal and snapshots.
pub mod kernel;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use error::LedgerError;
