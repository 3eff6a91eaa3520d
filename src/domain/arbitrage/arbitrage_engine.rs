//! Arbitrage finder - sizes a two-leg trade between pools quoting the same pair
//!
//! The trade always starts and ends in eth: swap `m` eth to dai in the pool
//! with the higher ratio-K, then swap that dai back to eth in the other pool.
//! There is no simple closed form for the best `m` once both legs charge a
//! fee, so the size is found by bisection on the post-trade ratio-K gap,
//! which shrinks monotonically as `m` grows. Every trial runs against clones;
//! the caller's pools are only read.

use tracing::{debug, info};

use super::{ArbitrageOutcome, Opportunity};
use crate::domain::pool::LiquidityPool;
use crate::math::{approx_eq, MAX_SEARCH_ITERATIONS};
use crate::shared::errors::PoolError;
use crate::shared::types::Asset;

/// Result of one simulated round trip at a given size
#[derive(Debug, Clone, Copy)]
struct Trial {
    eth_back: f64,
    high_k: f64,
    low_k: f64,
}

/// Stateless arbitrage search over two pools
#[derive(Debug, Clone, Copy)]
pub struct ArbitrageFinder {
    max_iterations: usize,
}

impl Default for ArbitrageFinder {
    fn default() -> Self {
        Self {
            max_iterations: MAX_SEARCH_ITERATIONS,
        }
    }
}

impl ArbitrageFinder {
    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Find the most profitable eth round trip between `pool_x` and `pool_y`.
    ///
    /// Argument order does not matter: the pool with the larger ratio-K always
    /// takes the first leg. Fails only when a pool has no eth reserve.
    pub fn find_arbitrage(
        &self,
        pool_x: &LiquidityPool,
        pool_y: &LiquidityPool,
    ) -> Result<ArbitrageOutcome, PoolError> {
        let k_x = pool_x.ratio_k()?;
        let k_y = pool_y.ratio_k()?;

        if approx_eq(k_x, k_y) {
            debug!(pool_x = %pool_x.name(), pool_y = %pool_y.name(), k = k_x, "No arbitrage opportunity detected");
            return Ok(ArbitrageOutcome::NoOpportunity);
        }

        let (high, low, arguments_swapped) = if k_y > k_x {
            (pool_y, pool_x, true)
        } else {
            (pool_x, pool_y, false)
        };

        let mut l = 0.0_f64;
        let mut r = high.reserve(Asset::Eth).min(low.reserve(Asset::Eth));
        let mut m = 0.0_f64;
        let mut iterations = 0;

        while !approx_eq(l, r) && iterations < self.max_iterations {
            iterations += 1;
            m = l + (r - l) / 2.0;
            match Self::simulate(high, low, m) {
                Ok(trial) if trial.high_k > trial.low_k => l = m,
                // Gap closed or crossed, or the second leg cannot be filled at this size.
                Ok(_) | Err(_) => r = m,
            }
        }

        // The last midpoint may sit past the point where the second pool can
        // no longer take the dai; `l` only ever moves to a size that filled.
        let trade = [m, l]
            .into_iter()
            .filter(|size| *size > 0.0)
            .find_map(|size| {
                Self::simulate(high, low, size)
                    .ok()
                    .map(|trial| (size, trial.eth_back))
            });
        let Some((m, eth_back)) = trade else {
            debug!(amount = m, iterations, "Search found no tradeable size");
            return Ok(ArbitrageOutcome::Unprofitable);
        };

        debug!(
            high = %high.name(),
            low = %low.name(),
            amount = m,
            eth_back,
            iterations,
            "Binary search converged"
        );

        let profit = eth_back - m;
        if profit < 0.0 {
            debug!(amount = m, loss = -profit, "Fees too high for arbitrage");
            return Ok(ArbitrageOutcome::Unprofitable);
        }

        let (first_label, second_label) = if arguments_swapped {
            ("second", "first")
        } else {
            ("first", "second")
        };
        info!(
            first_pool = %high.name(),
            second_pool = %low.name(),
            amount_eth = m,
            profit_eth = profit,
            "Swap ETH to DAI in the {} pool, then the DAI back to ETH in the {} pool",
            first_label,
            second_label
        );

        Ok(ArbitrageOutcome::Opportunity(Opportunity {
            first_pool: high.id(),
            second_pool: low.id(),
            amount_to_swap: m,
            expected_dai: high.quote(Asset::Eth, m)?,
            expected_return: eth_back,
            profit,
            arguments_swapped,
            iterations,
        }))
    }

    /// Run both legs at size `m` on throwaway copies
    fn simulate(high: &LiquidityPool, low: &LiquidityPool, m: f64) -> Result<Trial, PoolError> {
        let mut high = high.clone();
        let mut low = low.clone();

        let converted_dai = high.swap(Asset::Eth, Asset::Dai, m)?;
        let eth_back = low.swap(Asset::Dai, Asset::Eth, converted_dai)?;

        Ok(Trial {
            eth_back,
            high_k: high.ratio_k()?,
            low_k: low.ratio_k()?,
        })
    }
}

/// Shorthand for [`ArbitrageFinder::find_arbitrage`] with the default iteration cap
pub fn find_arbitrage(
    pool_x: &LiquidityPool,
    pool_y: &LiquidityPool,
) -> Result<ArbitrageOutcome, PoolError> {
    ArbitrageFinder::default().find_arbitrage(pool_x, pool_y)
}
