//! Shared scalar types and policy enums used across the ledgers.
//!
//! Identities and notifications live in `primitives.rs`; this module holds the
//! numeric vocabulary (amounts, decimal scale) and the small policy enums that
//! configuration selects between.

/// Unsigned fixed-point quantity. The real value is `amount / 10^decimals`.
pub type Amount = u128;

/// Liquidity share count. The first mint can be the full product of two
/// amounts, so shares need twice the width of an [`Amount`].
pub type Shares = crate::math::U256;

/// Default number of fractional decimal digits carried by every [`Amount`].
pub const DEFAULT_DECIMALS: u8 = 18;

/// `10^18`, one whole unit at the default scale.
pub const ONE: Amount = 1_000_000_000_000_000_000;

/// Largest decimal scale whose `10^decimals` still fits in an [`Amount`].
pub const MAX_DECIMALS: u8 = 38;

/// Returns `10^decimals`, or `None` when it does not fit in an [`Amount`].
pub fn scale_for(decimals: u8) -> Option<Amount> {
    (10 as Amount).checked_pow(decimals as u32)
}

/// One side of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    X,
    Y,
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Asset::X => "x",
            Asset::Y => "y",
        })
    }
}

/// Policy for the share supply minted by the very first liquidity deposit.
///
/// Two conventions exist in the wild: the plain product of the deposits, and
/// the product normalised back down by one decimal scale so that shares carry
/// the same number of fractional digits as the underlying assets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstMintPolicy {
    /// `shares = x * y`.
    #[default]
    Product = 0,
    /// `shares = x * y / 10^decimals`.
    ScaledProduct = 1,
}

impl TryFrom<u8> for FirstMintPolicy {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FirstMintPolicy::Product),
            1 => Ok(FirstMintPolicy::ScaledProduct),
            _ => Err(format!("Invalid FirstMintPolicy tag: {}", value)),
        }
    }
}
