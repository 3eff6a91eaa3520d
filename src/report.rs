// src/report.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::arbitrage::{ArbitrageOutcome, ExecutionResult};
use crate::domain::pool::LiquidityPool;
use crate::math::spread_bps;
use crate::shared::types::{PoolId, Reserves};
use crate::shared::utils;

#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    pub id: PoolId,
    pub name: String,
    pub reserves: Reserves,
    pub fee_rate: f64,
    pub ratio_k: Option<f64>,
    pub product_k: f64,
    pub total_shares: f64,
}

impl From<&LiquidityPool> for PoolSummary {
    fn from(pool: &LiquidityPool) -> Self {
        Self {
            id: pool.id(),
            name: pool.name().to_string(),
            reserves: pool.reserves(),
            fee_rate: pool.fee_rate(),
            ratio_k: pool.ratio_k().ok(),
            product_k: pool.product_k(),
            total_shares: pool.total_shares(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageReport {
    pub id: String,
    pub kind: &'static str,
    pub pools: Vec<PoolSummary>,
    pub spread_bps: Option<f64>,

    // Route, filled in for opportunities
    pub first_pool: Option<String>,
    pub second_pool: Option<String>,
    pub amount_to_swap: f64,
    pub profit: f64,

    pub outcome: ArbitrageOutcome,
    pub execution: Option<ExecutionResult>,
    pub timestamp: DateTime<Utc>,
}

impl ArbitrageReport {
    pub fn new(pool_x: &LiquidityPool, pool_y: &LiquidityPool, outcome: ArbitrageOutcome) -> Self {
        let spread = match (pool_x.ratio_k(), pool_y.ratio_k()) {
            (Ok(k_x), Ok(k_y)) => spread_bps(k_x, k_y),
            _ => None,
        };
        let name_of = |id: Option<PoolId>| {
            id.and_then(|id| {
                [pool_x, pool_y]
                    .into_iter()
                    .find(|pool| pool.id() == id)
                    .map(|pool| pool.name().to_string())
            })
        };

        Self {
            id: utils::generate_id(),
            kind: outcome.kind(),
            pools: vec![PoolSummary::from(pool_x), PoolSummary::from(pool_y)],
            spread_bps: spread,
            first_pool: name_of(outcome.first_pool()),
            second_pool: name_of(outcome.second_pool()),
            amount_to_swap: outcome.amount_to_swap(),
            profit: outcome.profit(),
            outcome,
            execution: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_execution(mut self, execution: ExecutionResult) -> Self {
        self.execution = Some(execution);
        self
    }

    pub fn is_opportunity(&self) -> bool {
        matches!(self.outcome, ArbitrageOutcome::Opportunity(_))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
