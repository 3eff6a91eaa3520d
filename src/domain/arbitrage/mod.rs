//! Arbitrage domain - opportunity search and execution

pub mod arbitrage_engine;
pub mod profit_calculator;

pub use arbitrage_engine::{find_arbitrage, ArbitrageFinder};
pub use profit_calculator::{ExecutionResult, ProfitCalculator};

use serde::Serialize;

use crate::shared::types::PoolId;

/// A sized, profitable round trip: `amount_to_swap` eth into `first_pool`,
/// the resulting dai into `second_pool`, netting `profit` eth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub first_pool: PoolId,
    pub second_pool: PoolId,
    pub amount_to_swap: f64,
    pub expected_dai: f64,
    pub expected_return: f64,
    pub profit: f64,
    /// The second argument held the higher ratio-K
    pub arguments_swapped: bool,
    pub iterations: usize,
}

/// What the finder concluded about a pool pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArbitrageOutcome {
    /// Ratio-K already matches
    NoOpportunity,
    /// Ratio-K diverges but fees eat the gain
    Unprofitable,
    Opportunity(Opportunity),
}

impl ArbitrageOutcome {
    /// Eth to swap; `0` for no opportunity and `-1` when fees exceed the gain
    pub fn amount_to_swap(&self) -> f64 {
        match self {
            ArbitrageOutcome::NoOpportunity => 0.0,
            ArbitrageOutcome::Unprofitable => -1.0,
            ArbitrageOutcome::Opportunity(opportunity) => opportunity.amount_to_swap,
        }
    }

    pub fn profit(&self) -> f64 {
        match self {
            ArbitrageOutcome::Opportunity(opportunity) => opportunity.profit,
            _ => 0.0,
        }
    }

    pub fn first_pool(&self) -> Option<PoolId> {
        self.opportunity().map(|opportunity| opportunity.first_pool)
    }

    pub fn second_pool(&self) -> Option<PoolId> {
        self.opportunity().map(|opportunity| opportunity.second_pool)
    }

    pub fn opportunity(&self) -> Option<&Opportunity> {
        match self {
            ArbitrageOutcome::Opportunity(opportunity) => Some(opportunity),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ArbitrageOutcome::NoOpportunity => "no_opportunity",
            ArbitrageOutcome::Unprofitable => "unprofitable",
            ArbitrageOutcome::Opportunity(_) => "opportunity",
        }
    }
}
