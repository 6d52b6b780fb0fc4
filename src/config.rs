//! Pool configuration.
//!
//! Configuration is plain data: it is deserialized from JSON, validated once,
//! and then fixed for the lifetime of the pool.

use crate::types::{scale_for, Amount, FirstMintPolicy, DEFAULT_DECIMALS, MAX_DECIMALS};

/// Errors raised while loading or validating a [`PoolConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("decimal scale {0} does not fit in a 128-bit amount (max {max})", max = MAX_DECIMALS)]
    InvalidDecimals(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Fractional decimal digits carried by both pool assets.
    pub decimals: u8,
    /// How many shares the first liquidity deposit mints.
    pub first_mint: FirstMintPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            decimals: DEFAULT_DECIMALS,
            first_mint: FirstMintPolicy::default(),
        }
    }
}

impl PoolConfig {
    /// Parses and validates a configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scale().map(|_| ())
    }

    /// `10^decimals`.
    pub fn scale(&self) -> Result<Amount, ConfigError> {
        scale_for(self.decimals).ok_or(ConfigError::InvalidDecimals(self.decimals))
    }
}
