//! Constant-product liquidity pool (x·y=k) over the dai/eth pair

use serde::Serialize;
use std::fmt;

use crate::math::{approx_eq, approx_eq_with, PROPORTION_TOLERANCE};
use crate::shared::errors::PoolError;
use crate::shared::types::{Asset, PoolConfig, PoolId, Reserves};

/// Two-asset pool with a swap fee and an aggregate share supply.
///
/// Per-owner shares are not tracked here; see `UserAccount`.
/// `Clone` is a deep copy that keeps the same [`PoolId`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiquidityPool {
    id: PoolId,
    name: String,
    reserve_a: f64,
    reserve_b: f64,
    fee_rate: f64,
    total_shares: f64,
}

impl LiquidityPool {
    /// Create a pool seeded with `reserve_a` dai and `reserve_b` eth.
    ///
    /// The initial share supply is `sqrt(reserve_a * reserve_b)`.
    pub fn new(reserve_a: f64, reserve_b: f64, fee_rate: f64) -> Result<Self, PoolError> {
        Self::with_name("pool", reserve_a, reserve_b, fee_rate)
    }

    pub fn with_name(
        name: impl Into<String>,
        reserve_a: f64,
        reserve_b: f64,
        fee_rate: f64,
    ) -> Result<Self, PoolError> {
        if !(0.0..1.0).contains(&fee_rate) {
            return Err(PoolError::InvalidFeeRate(fee_rate));
        }
        validate_amount(reserve_a)?;
        validate_amount(reserve_b)?;

        Ok(Self {
            id: PoolId::new(),
            name: name.into(),
            reserve_a,
            reserve_b,
            fee_rate,
            total_shares: (reserve_a * reserve_b).sqrt(),
        })
    }

    pub fn from_config(name: impl Into<String>, cfg: &PoolConfig) -> Result<Self, PoolError> {
        Self::with_name(name, cfg.dai, cfg.eth, cfg.swap_fee)
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fee_rate(&self) -> f64 {
        self.fee_rate
    }

    pub fn total_shares(&self) -> f64 {
        self.total_shares
    }

    pub fn reserve(&self, asset: Asset) -> f64 {
        match asset {
            Asset::Dai => self.reserve_a,
            Asset::Eth => self.reserve_b,
        }
    }

    pub fn reserves(&self) -> Reserves {
        Reserves {
            dai: self.reserve_a,
            eth: self.reserve_b,
        }
    }

    /// Ratio-K: `reserve_a / reserve_b`, the price signal compared across pools.
    pub fn ratio_k(&self) -> Result<f64, PoolError> {
        if self.reserve_b == 0.0 {
            return Err(PoolError::DivisionByZero);
        }
        Ok(self.reserve_a / self.reserve_b)
    }

    /// Product-K: `reserve_a * reserve_b`, the swap invariant.
    pub fn product_k(&self) -> f64 {
        self.reserve_a * self.reserve_b
    }

    /// Output of swapping `amount` of `from` into the other asset, without mutating.
    pub fn quote(&self, from: Asset, amount: f64) -> Result<f64, PoolError> {
        validate_amount(amount)?;
        let reserve_in = self.reserve(from);
        let reserve_out = self.reserve(from.other());
        if reserve_in < amount {
            return Err(PoolError::InsufficientFunds {
                requested: amount,
                available: reserve_in,
            });
        }

        let amount_effective = amount * (1.0 - self.fee_rate);
        // Pre-trade product; the fee portion is excluded from the curve.
        let k = reserve_out * reserve_in;
        let denominator = reserve_in + amount_effective;
        if denominator == 0.0 {
            return Ok(0.0);
        }
        Ok(reserve_out - k / denominator)
    }

    /// Swap `amount` of `from` into `to`, returning the amount paid out.
    ///
    /// The full `amount`, fee included, enters the pool, so product-K grows
    /// whenever both the fee and the amount are positive.
    pub fn swap(&mut self, from: Asset, to: Asset, amount: f64) -> Result<f64, PoolError> {
        if from == to {
            return Err(PoolError::SameAsset(from));
        }
        let amount_out = self.quote(from, amount)?;

        *self.reserve_mut(from) += amount;
        *self.reserve_mut(to) -= amount_out;

        Ok(amount_out)
    }

    /// Deposit dai and eth in the pool's current proportion, minting `sqrt(dai * eth)` shares.
    pub fn add_liquidity(&mut self, amount_a: f64, amount_b: f64) -> Result<f64, PoolError> {
        validate_amount(amount_a)?;
        validate_amount(amount_b)?;

        if self.reserve_a == 0.0 || self.reserve_b == 0.0 {
            // Seeding an empty pool: any positive pair sets the price.
            if self.reserve_a != 0.0 || self.reserve_b != 0.0 {
                return Err(PoolError::DivisionByZero);
            }
            if amount_a <= 0.0 || amount_b <= 0.0 {
                return Err(PoolError::InvalidAmount(amount_a.min(amount_b)));
            }
        } else {
            if amount_b == 0.0 {
                return Err(PoolError::DivisionByZero);
            }
            let expected = self.reserve_a / self.reserve_b;
            let actual = amount_a / amount_b;
            if !approx_eq_with(actual, expected, PROPORTION_TOLERANCE, 0.0) {
                return Err(PoolError::ProportionMismatch { expected, actual });
            }
        }

        let minted = (amount_a * amount_b).sqrt();
        self.reserve_a += amount_a;
        self.reserve_b += amount_b;
        self.total_shares += minted;

        Ok(minted)
    }

    /// Burn `shares` and withdraw the proportional dai and eth.
    pub fn remove_liquidity(&mut self, shares: f64) -> Result<(f64, f64), PoolError> {
        validate_amount(shares)?;
        if shares > self.total_shares {
            return Err(PoolError::InsufficientShares {
                requested: shares,
                available: self.total_shares,
            });
        }
        if shares == 0.0 {
            return Ok((0.0, 0.0));
        }

        if approx_eq(shares, self.total_shares) {
            let drained = (self.reserve_a, self.reserve_b);
            self.reserve_a = 0.0;
            self.reserve_b = 0.0;
            self.total_shares = 0.0;
            return Ok(drained);
        }

        let proportion = shares / self.total_shares;
        let amount_a = proportion * self.reserve_a;
        let amount_b = proportion * self.reserve_b;
        self.reserve_a -= amount_a;
        self.reserve_b -= amount_b;
        self.total_shares -= shares;

        Ok((amount_a, amount_b))
    }

    fn reserve_mut(&mut self, asset: Asset) -> &mut f64 {
        match asset {
            Asset::Dai => &mut self.reserve_a,
            Asset::Eth => &mut self.reserve_b,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_reserve(&mut self, asset: Asset, value: f64) {
        *self.reserve_mut(asset) = value;
    }
}

impl fmt::Display for LiquidityPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: DAI {}, ETH {} (fee {})",
            self.name, self.reserve_a, self.reserve_b, self.fee_rate
        )
    }
}

fn validate_amount(amount: f64) -> Result<(), PoolError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(PoolError::InvalidAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pool_a() -> LiquidityPool {
        LiquidityPool::with_name("PoolA", 303.0, 101.0, 0.01).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-7,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_new_pool_mints_initial_shares() {
        let pool = pool_a();
        assert_close(pool.total_shares(), (303.0_f64 * 101.0).sqrt());
        assert_close(pool.ratio_k().unwrap(), 3.0);
        assert_close(pool.product_k(), 303.0 * 101.0);
    }

    #[test]
    fn test_rejects_bad_fee() {
        assert_eq!(
            LiquidityPool::new(1.0, 1.0, 1.0).unwrap_err(),
            PoolError::InvalidFeeRate(1.0)
        );
        assert!(LiquidityPool::new(1.0, 1.0, -0.1).is_err());
        assert!(LiquidityPool::new(-1.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_swap_dai_to_eth() {
        let mut pool = pool_a();
        let prev_k = pool.product_k();
        let amount = 2.0;
        let effective = amount * (1.0 - 0.01);
        let expected_out = 101.0 - prev_k / (303.0 + effective);

        let out = pool.swap(Asset::Dai, Asset::Eth, amount).unwrap();

        assert_close(out, expected_out);
        assert_close(pool.reserve(Asset::Dai), 303.0 + amount);
        assert_close(pool.reserve(Asset::Eth), 101.0 - expected_out);
        assert!(pool.product_k() > prev_k, "k did not increase after swap");
    }

    #[test]
    fn test_swap_insufficient_funds() {
        let mut pool = pool_a();
        let before = pool.clone();
        let err = pool.swap(Asset::Eth, Asset::Dai, 500.0).unwrap_err();
        assert!(matches!(err, PoolError::InsufficientFunds { .. }));
        assert_eq!(pool, before);
    }

    #[test]
    fn test_swap_rejects_negative_amount() {
        let mut pool = pool_a();
        assert_eq!(
            pool.swap(Asset::Dai, Asset::Eth, -1.0).unwrap_err(),
            PoolError::InvalidAmount(-1.0)
        );
    }

    #[test]
    fn test_swap_same_asset() {
        let mut pool = pool_a();
        assert_eq!(
            pool.swap(Asset::Eth, Asset::Eth, 1.0).unwrap_err(),
            PoolError::SameAsset(Asset::Eth)
        );
    }

    #[test]
    fn test_swap_without_fee_keeps_product() {
        let mut pool = LiquidityPool::new(1000.0, 10.0, 0.0).unwrap();
        let prev_k = pool.product_k();
        pool.swap(Asset::Eth, Asset::Dai, 1.0).unwrap();
        assert!((pool.product_k() - prev_k).abs() / prev_k < 1e-12);
    }

    #[test]
    fn test_quote_matches_swap() {
        let mut pool = pool_a();
        let before = pool.clone();
        let quoted = pool.quote(Asset::Eth, 3.0).unwrap();
        assert_eq!(pool, before);
        let out = pool.swap(Asset::Eth, Asset::Dai, 3.0).unwrap();
        assert_eq!(quoted, out);
    }

    #[test]
    fn test_add_liquidity() {
        let mut pool = pool_a();
        let shares_before = pool.total_shares();

        let minted = pool.add_liquidity(3.0, 1.0).unwrap();

        assert_close(minted, 3.0_f64.sqrt());
        assert_close(pool.reserve(Asset::Dai), 306.0);
        assert_close(pool.reserve(Asset::Eth), 102.0);
        assert_close(pool.total_shares(), shares_before + 3.0_f64.sqrt());
        assert_close(pool.total_shares(), (306.0_f64 * 102.0).sqrt());
    }

    #[test]
    fn test_add_liquidity_proportion_mismatch() {
        let mut pool = pool_a();
        let before = pool.clone();
        let err = pool.add_liquidity(1.0, 1.0).unwrap_err();
        assert!(matches!(err, PoolError::ProportionMismatch { .. }));
        assert_eq!(pool, before);
    }

    #[test]
    fn test_add_liquidity_within_tolerance() {
        let mut pool = pool_a();
        assert!(pool.add_liquidity(3.000001, 1.0).is_ok());
        assert!(pool.add_liquidity(3.001, 1.0).is_err());
    }

    #[test]
    fn test_seed_empty_pool() {
        let mut pool = LiquidityPool::new(0.0, 0.0, 0.003).unwrap();
        assert_eq!(pool.total_shares(), 0.0);
        assert_eq!(pool.ratio_k().unwrap_err(), PoolError::DivisionByZero);

        let minted = pool.add_liquidity(400.0, 100.0).unwrap();
        assert_close(minted, 200.0);
        assert_close(pool.ratio_k().unwrap(), 4.0);

        // Proportion enforced once seeded
        assert!(pool.add_liquidity(1.0, 1.0).is_err());
    }

    #[test]
    fn test_seed_empty_pool_requires_both_sides() {
        let mut pool = LiquidityPool::new(0.0, 0.0, 0.003).unwrap();
        assert!(pool.add_liquidity(10.0, 0.0).is_err());
    }

    #[test]
    fn test_remove_liquidity() {
        let mut pool = pool_a();
        pool.add_liquidity(3.0, 1.0).unwrap();

        let total = pool.total_shares();
        let dai = pool.reserve(Asset::Dai);
        let eth = pool.reserve(Asset::Eth);
        let new_dai = dai - dai / total;
        let new_eth = eth - eth / total;

        let (out_a, out_b) = pool.remove_liquidity(1.0).unwrap();

        assert_close(out_a, dai / total);
        assert_close(out_b, eth / total);
        assert_close(pool.reserve(Asset::Dai), new_dai);
        assert_close(pool.reserve(Asset::Eth), new_eth);
        assert_close(pool.total_shares(), (new_dai * new_eth).sqrt());
    }

    #[test]
    fn test_remove_liquidity_insufficient_shares() {
        let mut pool = pool_a();
        let err = pool.remove_liquidity(pool.total_shares() + 1.0).unwrap_err();
        assert!(matches!(err, PoolError::InsufficientShares { .. }));
    }

    #[test]
    fn test_full_drain() {
        let mut pool = pool_a();
        pool.swap(Asset::Dai, Asset::Eth, 7.0).unwrap();
        let (dai, eth) = pool.remove_liquidity(pool.total_shares()).unwrap();

        assert!(dai > 0.0 && eth > 0.0);
        assert_eq!(pool.reserve(Asset::Dai), 0.0);
        assert_eq!(pool.reserve(Asset::Eth), 0.0);
        assert_eq!(pool.total_shares(), 0.0);
    }

    #[test]
    fn test_clone_is_independent() {
        let pool = pool_a();
        let mut copy = pool.clone();
        copy.swap(Asset::Eth, Asset::Dai, 10.0).unwrap();

        assert_eq!(copy.id(), pool.id());
        assert_eq!(pool.reserve(Asset::Eth), 101.0);
        assert_eq!(pool.reserve(Asset::Dai), 303.0);
        assert_ne!(copy.reserve(Asset::Eth), 101.0);
    }

    proptest! {
        #[test]
        fn prop_swap_grows_product_k(
            dai in 1.0f64..1e6,
            eth in 1.0f64..1e6,
            fee in 0.0001f64..0.5,
            fraction in 0.001f64..1.0,
            eth_in in any::<bool>(),
        ) {
            let mut pool = LiquidityPool::new(dai, eth, fee).unwrap();
            let from = if eth_in { Asset::Eth } else { Asset::Dai };
            let amount = pool.reserve(from) * fraction;
            let prev_k = pool.product_k();

            let out = pool.swap(from, from.other(), amount).unwrap();

            prop_assert!(out > 0.0);
            prop_assert!(pool.reserve(from.other()) > 0.0);
            prop_assert!(pool.product_k() > prev_k);
        }

        #[test]
        fn prop_proportional_deposit_is_accepted(
            dai in 1.0f64..1e6,
            eth in 1.0f64..1e6,
            scale in 0.001f64..10.0,
        ) {
            let mut pool = LiquidityPool::new(dai, eth, 0.003).unwrap();
            let amount_b = eth * scale;
            let amount_a = amount_b * pool.ratio_k().unwrap();

            let minted = pool.add_liquidity(amount_a, amount_b).unwrap();

            prop_assert!((minted - (amount_a * amount_b).sqrt()).abs() < 1e-9 * minted.max(1.0));
            prop_assert!((pool.reserve(Asset::Dai) - (dai + amount_a)).abs() < 1e-9 * (dai + amount_a));
        }
    }
}
