//! Pool manager for liquidity pool operations

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::LiquidityPool;
use crate::shared::errors::{ArbitrageError, PoolError};
use crate::shared::types::{PoolId, PoolsConfig};

/// A pool behind its own lock; mutations to one pool are serialized by it.
pub type SharedPool = Arc<RwLock<LiquidityPool>>;

/// Registry of live pools keyed by [`PoolId`]
#[derive(Default, Clone)]
pub struct PoolManager {
    pools: HashMap<PoolId, SharedPool>,
    names: Vec<(String, PoolId)>,
}

impl PoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build pools from named config definitions, in name order
    pub fn from_config(config: &PoolsConfig) -> Result<Self, PoolError> {
        let mut manager = Self::new();
        for (name, pool_cfg) in &config.pools {
            let pool = LiquidityPool::from_config(name.clone(), pool_cfg)?;
            info!(pool = %name, dai = pool_cfg.dai, eth = pool_cfg.eth, fee = pool_cfg.swap_fee, "Loaded pool");
            manager.add_pool(pool);
        }
        Ok(manager)
    }

    pub fn add_pool(&mut self, pool: LiquidityPool) -> PoolId {
        let id = pool.id();
        self.names.push((pool.name().to_string(), id));
        self.pools.insert(id, Arc::new(RwLock::new(pool)));
        id
    }

    pub fn get(&self, id: PoolId) -> Result<SharedPool, ArbitrageError> {
        self.pools
            .get(&id)
            .cloned()
            .ok_or(ArbitrageError::PoolNotFound(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<PoolId> {
        self.names
            .iter()
            .find(|(pool_name, _)| pool_name == name)
            .map(|(_, id)| *id)
    }

    /// Pool ids in insertion order
    pub fn pool_ids(&self) -> Vec<PoolId> {
        self.names.iter().map(|(_, id)| *id).collect()
    }

    /// Every unordered pair of distinct pools
    pub fn pairs(&self) -> Vec<(PoolId, PoolId)> {
        let ids = self.pool_ids();
        let mut pairs = Vec::new();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                pairs.push((*a, *b));
            }
        }
        pairs
    }

    /// Consistent copy of a pool taken under its read lock
    pub async fn snapshot(&self, id: PoolId) -> Result<LiquidityPool, ArbitrageError> {
        let pool = self.get(id)?;
        let guard = pool.read().await;
        Ok(guard.clone())
    }

    pub async fn snapshot_all(&self) -> Vec<LiquidityPool> {
        let mut snapshots = Vec::with_capacity(self.names.len());
        for (_, id) in &self.names {
            if let Some(pool) = self.pools.get(id) {
                snapshots.push(pool.read().await.clone());
            }
        }
        snapshots
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::ConfigLoader;
    use crate::shared::types::Asset;

    fn config() -> PoolsConfig {
        ConfigLoader::from_json_str(
            r#"{
                "PoolA": { "dai": 303, "eth": 101, "swap_fee": 0.01 },
                "PoolB": { "dai": 200, "eth": 100, "swap_fee": 0.003 },
                "PoolC": { "dai": 310, "eth": 100, "swap_fee": 0.3 }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_from_config() {
        let manager = PoolManager::from_config(&config()).unwrap();
        assert_eq!(manager.len(), 3);
        assert!(manager.find_by_name("PoolB").is_some());
        assert!(manager.find_by_name("PoolZ").is_none());
        assert_eq!(manager.pairs().len(), 3);
    }

    #[tokio::test]
    async fn test_snapshot_is_detached() {
        let manager = PoolManager::from_config(&config()).unwrap();
        let id = manager.find_by_name("PoolA").unwrap();

        let mut snapshot = manager.snapshot(id).await.unwrap();
        snapshot.swap(Asset::Eth, Asset::Dai, 5.0).unwrap();

        let live = manager.snapshot(id).await.unwrap();
        assert_eq!(live.reserve(Asset::Eth), 101.0);
        assert_eq!(live.name(), "PoolA");
    }

    #[tokio::test]
    async fn test_unknown_pool() {
        let manager = PoolManager::new();
        let id = PoolId::new();
        assert_eq!(
            manager.snapshot(id).await.unwrap_err(),
            ArbitrageError::PoolNotFound(id)
        );
    }
}
