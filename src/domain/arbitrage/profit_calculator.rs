//! Execution of a sized opportunity and realized-profit accounting

use serde::Serialize;
use tracing::info;

use super::Opportunity;
use crate::domain::pool::LiquidityPool;
use crate::shared::errors::ArbitrageError;
use crate::shared::types::Asset;

/// Outcome of executing both legs on the real pools
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub amount_in: f64,
    pub intermediate_dai: f64,
    pub amount_out: f64,
    pub realized_profit: f64,
}

impl ExecutionResult {
    pub fn roi(&self) -> f64 {
        if self.amount_in > 0.0 {
            (self.realized_profit / self.amount_in) * 100.0
        } else {
            0.0
        }
    }
}

/// Applies opportunities to pools and checks profitability
pub struct ProfitCalculator {
    pub min_profit: f64,
}

impl ProfitCalculator {
    pub fn new(min_profit: f64) -> Self {
        Self { min_profit }
    }

    pub fn is_profitable(&self, opportunity: &Opportunity) -> bool {
        opportunity.profit > 0.0 && opportunity.profit >= self.min_profit
    }

    /// Swap eth to dai in `first`, then the dai back to eth in `second`.
    ///
    /// Both legs run on copies and are committed together, so a failing
    /// second leg leaves both pools untouched.
    pub fn execute(
        &self,
        opportunity: &Opportunity,
        first: &mut LiquidityPool,
        second: &mut LiquidityPool,
    ) -> Result<ExecutionResult, ArbitrageError> {
        if first.id() != opportunity.first_pool {
            return Err(ArbitrageError::PoolNotFound(opportunity.first_pool));
        }
        if second.id() != opportunity.second_pool {
            return Err(ArbitrageError::PoolNotFound(opportunity.second_pool));
        }

        let mut next_first = first.clone();
        let mut next_second = second.clone();

        let amount_in = opportunity.amount_to_swap;
        let intermediate_dai = next_first.swap(Asset::Eth, Asset::Dai, amount_in)?;
        let amount_out = next_second.swap(Asset::Dai, Asset::Eth, intermediate_dai)?;

        *first = next_first;
        *second = next_second;

        let result = ExecutionResult {
            amount_in,
            intermediate_dai,
            amount_out,
            realized_profit: amount_out - amount_in,
        };
        info!(
            first_pool = %first.name(),
            second_pool = %second.name(),
            amount_in,
            amount_out,
            profit = result.realized_profit,
            "Executed arbitrage"
        );

        Ok(result)
    }
}

impl Default for ProfitCalculator {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arbitrage::{find_arbitrage, ArbitrageOutcome};

    fn pools() -> (LiquidityPool, LiquidityPool) {
        (
            LiquidityPool::with_name("PoolA", 303.0, 101.0, 0.01).unwrap(),
            LiquidityPool::with_name("PoolB", 200.0, 100.0, 0.003).unwrap(),
        )
    }

    fn opportunity(a: &LiquidityPool, b: &LiquidityPool) -> Opportunity {
        match find_arbitrage(a, b).unwrap() {
            ArbitrageOutcome::Opportunity(opportunity) => opportunity,
            other => panic!("expected an opportunity, got {other:?}"),
        }
    }

    #[test]
    fn test_execute_reproduces_expected_profit() {
        let (mut pool_a, mut pool_b) = pools();
        let opportunity = opportunity(&pool_a, &pool_b);
        let calculator = ProfitCalculator::default();

        let result = calculator
            .execute(&opportunity, &mut pool_a, &mut pool_b)
            .unwrap();

        assert_eq!(result.intermediate_dai, opportunity.expected_dai);
        assert!((result.realized_profit - opportunity.profit).abs() < 1e-9);
        assert!(result.roi() > 0.0);
        assert!((pool_a.ratio_k().unwrap() - pool_b.ratio_k().unwrap()).abs() < 1e-7);
    }

    #[test]
    fn test_execute_rejects_wrong_pools() {
        let (mut pool_a, mut pool_b) = pools();
        let opportunity = opportunity(&pool_a, &pool_b);
        let before = (pool_a.clone(), pool_b.clone());

        let err = ProfitCalculator::default()
            .execute(&opportunity, &mut pool_b, &mut pool_a)
            .unwrap_err();

        assert!(matches!(err, ArbitrageError::PoolNotFound(_)));
        assert_eq!((pool_a, pool_b), before);
    }

    #[test]
    fn test_failed_second_leg_commits_nothing() {
        let (mut pool_a, _) = pools();
        let mut shallow = LiquidityPool::with_name("Shallow", 1.0, 100.0, 0.0).unwrap();
        let opportunity = Opportunity {
            first_pool: pool_a.id(),
            second_pool: shallow.id(),
            amount_to_swap: 10.0,
            expected_dai: 0.0,
            expected_return: 0.0,
            profit: 0.0,
            arguments_swapped: false,
            iterations: 0,
        };
        let before = (pool_a.clone(), shallow.clone());

        let err = ProfitCalculator::default()
            .execute(&opportunity, &mut pool_a, &mut shallow)
            .unwrap_err();

        assert!(matches!(err, ArbitrageError::Pool(_)));
        assert_eq!((pool_a, shallow), before);
    }

    #[test]
    fn test_min_profit_threshold() {
        let (pool_a, pool_b) = pools();
        let opportunity = opportunity(&pool_a, &pool_b);

        assert!(ProfitCalculator::new(0.5).is_profitable(&opportunity));
        assert!(!ProfitCalculator::new(100.0).is_profitable(&opportunity));
    }
}
