//! User balances and liquidity-provider shares

use std::collections::HashMap;
use tracing::debug;

use crate::domain::pool::LiquidityPool;
use crate::shared::errors::AccountError;
use crate::shared::types::{Asset, PoolId};

/// A trader / liquidity provider holding dai, eth and pool shares
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAccount {
    dai: f64,
    eth: f64,
    shares: HashMap<PoolId, f64>,
}

impl UserAccount {
    pub fn new(dai: f64, eth: f64) -> Self {
        Self {
            dai,
            eth,
            shares: HashMap::new(),
        }
    }

    pub fn balance(&self, asset: Asset) -> f64 {
        match asset {
            Asset::Dai => self.dai,
            Asset::Eth => self.eth,
        }
    }

    pub fn shares(&self, pool_id: PoolId) -> f64 {
        self.shares.get(&pool_id).copied().unwrap_or(0.0)
    }

    /// Record shares acquired outside of `add_liquidity`, e.g. a pool's seed liquidity
    pub fn grant_shares(&mut self, pool_id: PoolId, shares: f64) {
        *self.shares.entry(pool_id).or_insert(0.0) += shares;
    }

    pub fn add_liquidity(
        &mut self,
        pool: &mut LiquidityPool,
        dai: f64,
        eth: f64,
    ) -> Result<f64, AccountError> {
        self.ensure_funds(Asset::Dai, dai)?;
        self.ensure_funds(Asset::Eth, eth)?;

        let minted = pool.add_liquidity(dai, eth)?;
        self.grant_shares(pool.id(), minted);
        self.dai -= dai;
        self.eth -= eth;

        debug!(pool = %pool.name(), dai, eth, minted, "Added liquidity");
        Ok(minted)
    }

    pub fn remove_liquidity(
        &mut self,
        pool: &mut LiquidityPool,
        shares: f64,
    ) -> Result<(f64, f64), AccountError> {
        let held = self.shares(pool.id());
        if shares > held {
            return Err(AccountError::InsufficientShares {
                requested: shares,
                available: held,
            });
        }

        let (dai, eth) = pool.remove_liquidity(shares)?;
        self.shares.insert(pool.id(), held - shares);
        self.dai += dai;
        self.eth += eth;

        debug!(pool = %pool.name(), shares, dai, eth, "Removed liquidity");
        Ok((dai, eth))
    }

    pub fn swap(
        &mut self,
        pool: &mut LiquidityPool,
        from: Asset,
        to: Asset,
        amount: f64,
    ) -> Result<f64, AccountError> {
        self.ensure_funds(from, amount)?;

        let amount_out = pool.swap(from, to, amount)?;
        *self.balance_mut(from) -= amount;
        *self.balance_mut(to) += amount_out;

        debug!(pool = %pool.name(), %from, %to, amount, amount_out, "User swap");
        Ok(amount_out)
    }

    fn ensure_funds(&self, asset: Asset, amount: f64) -> Result<(), AccountError> {
        let available = self.balance(asset);
        if amount > available {
            return Err(AccountError::InsufficientFunds {
                asset,
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    fn balance_mut(&mut self, asset: Asset) -> &mut f64 {
        match asset {
            Asset::Dai => &mut self.dai,
            Asset::Eth => &mut self.eth,
        }
    }
}
