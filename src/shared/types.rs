//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// One side of a two-asset pool.
///
/// `Dai` is reserve A (the numerator of ratio-K), `Eth` is reserve B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Dai,
    Eth,
}

impl Asset {
    /// The opposite side of the pair
    pub fn other(self) -> Self {
        match self {
            Asset::Dai => Asset::Eth,
            Asset::Eth => Asset::Dai,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Asset::Dai => "DAI",
            Asset::Eth => "ETH",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Opaque pool handle issued at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PoolId(Uuid);

impl PoolId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PoolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reserve pair snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reserves {
    pub dai: f64,
    pub eth: f64,
}

/// A single pool definition in the config document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub dai: f64,
    pub eth: f64,
    pub swap_fee: f64,
}

/// Named pool definitions, e.g. `{"PoolA": {"dai": 303, "eth": 101, "swap_fee": 0.01}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolsConfig {
    pub pools: BTreeMap<String, PoolConfig>,
}

impl PoolsConfig {
    pub fn get(&self, name: &str) -> Option<&PoolConfig> {
        self.pools.get(name)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
