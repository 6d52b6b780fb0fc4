use std::fmt;
use std::str::FromStr;

use crate::types::{Amount, Shares};

// --- Identities -------------------------------------------------------------

/// A 20-byte account or component identity supplied by the execution
/// environment. Rendered (and serialized) as `0x`-prefixed lowercase hex so it
/// can be used as a JSON map key.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AddressBytes(pub [u8; 20]);
pub type Address = AddressBytes;

impl AddressBytes {
    /// Convenience constructor for fixtures: every byte set to `byte`.
    pub const fn repeat(byte: u8) -> Self {
        AddressBytes([byte; 20])
    }
}

impl fmt::Display for AddressBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AddressBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Error returned when parsing an address from text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AddressParseError {
    #[error("address is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("address must be 20 bytes, got {0}")]
    Length(usize),
}

impl FromStr for AddressBytes {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits)?;
        let bytes: [u8; 20] = raw
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::Length(raw.len()))?;
        Ok(AddressBytes(bytes))
    }
}

impl serde::Serialize for AddressBytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for AddressBytes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// --- Notifications ----------------------------------------------------------

/// Observable side effect of a successful mutating call. Exactly one is emitted
/// per committed operation; failed operations emit nothing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Event {
    /// Liquidity added to the pool (both `init` and `mint`).
    Liquidity {
        provider: Address,
        x: Amount,
        y: Amount,
        #[serde(with = "crate::math::decimal")]
        shares: Shares,
    },
    /// Shares burned and the proportional reserves paid out.
    Burn {
        provider: Address,
        #[serde(with = "crate::math::decimal")]
        shares: Shares,
        x: Amount,
        y: Amount,
    },
    SellX { seller: Address, x_in: Amount, y_out: Amount },
    SellY { seller: Address, y_in: Amount, x_out: Amount },
    Deposit { owner: Address, amount: Amount },
    Withdraw { owner: Address, amount: Amount },
    Claim { owner: Address, name: String },
    Release { owner: Address, name: String },
}

impl Event {
    /// The identity that caused this event.
    pub fn actor(&self) -> Address {
        match self {
            Event::Liquidity { provider, .. } | Event::Burn { provider, .. } => *provider,
            Event::SellX { seller, .. } | Event::SellY { seller, .. } => *seller,
            Event::Deposit { owner, .. }
            | Event::Withdraw { owner, .. }
            | Event::Claim { owner, .. }
            | Event::Release { owner, .. } => *owner,
        }
    }
}
