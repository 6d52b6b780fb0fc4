//! Serde helpers that carry [`U256`] values as decimal strings.
//!
//! JSON numbers stop being exact well before 256 bits, so share counts are
//! written as strings. Plain integers are still accepted on input.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::math::U256;

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 256-bit unsigned integer as a decimal string")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> Result<U256, E> {
        U256::from_dec_str(text).map_err(|err| E::custom(format!("{:?}", err)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<U256, E> {
        Ok(U256::from(value))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<U256, E> {
        Ok(U256::from(value))
    }
}

/// `#[serde(with = "crate::math::decimal")]` for a single value.
pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    deserializer.deserialize_any(DecimalVisitor)
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct Decimal(#[serde(with = "crate::math::decimal")] U256);

/// `#[serde(with = "crate::math::decimal::map")]` for maps of values.
pub mod map {
    use super::*;

    pub fn serialize<K, S>(values: &BTreeMap<K, U256>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        S: Serializer,
    {
        serializer.collect_map(values.iter().map(|(key, value)| (key, Decimal(*value))))
    }

    pub fn deserialize<'de, K, D>(deserializer: D) -> Result<BTreeMap<K, U256>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<K, Decimal>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|(key, Decimal(value))| (key, value)).collect())
    }
}
