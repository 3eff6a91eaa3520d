//! Arbitrage services over the shared pool registry

use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::account::UserAccount;
use crate::domain::arbitrage::{ArbitrageFinder, ArbitrageOutcome, Opportunity, ProfitCalculator};
use crate::domain::pool::PoolManager;
use crate::math::approx_eq;
use crate::report::ArbitrageReport;
use crate::shared::errors::{AccountError, ArbitrageError};
use crate::shared::types::{Asset, PoolId};

/// Scans pool pairs on read-lock snapshots and executes under write locks
pub struct ArbitrageService {
    pools: PoolManager,
    finder: ArbitrageFinder,
    calculator: ProfitCalculator,
}

impl ArbitrageService {
    pub fn new(pools: PoolManager, min_profit: f64) -> Self {
        Self {
            pools,
            finder: ArbitrageFinder::default(),
            calculator: ProfitCalculator::new(min_profit),
        }
    }

    pub fn pools(&self) -> &PoolManager {
        &self.pools
    }

    /// Run the finder on fresh snapshots of two pools
    pub async fn scan_pair(&self, a: PoolId, b: PoolId) -> Result<ArbitrageReport, ArbitrageError> {
        if a == b {
            return Err(ArbitrageError::SamePool);
        }
        let pool_a = self.pools.snapshot(a).await?;
        let pool_b = self.pools.snapshot(b).await?;

        let outcome = self.finder.find_arbitrage(&pool_a, &pool_b)?;
        Ok(ArbitrageReport::new(&pool_a, &pool_b, outcome))
    }

    /// Scan every pool pair. Pairs that cannot be priced are skipped with a warning.
    pub async fn scan_all(&self) -> Vec<ArbitrageReport> {
        let mut reports = Vec::new();
        for (a, b) in self.pools.pairs() {
            match self.scan_pair(a, b).await {
                Ok(report) => reports.push(report),
                Err(e) => warn!(pool_a = %a, pool_b = %b, "Skipping pair: {}", e),
            }
        }
        reports
    }

    /// Opportunities that clear the profit threshold, best first
    pub async fn find_opportunities(&self) -> Vec<ArbitrageReport> {
        let mut opportunities: Vec<_> = self
            .scan_all()
            .await
            .into_iter()
            .filter(|report| {
                report
                    .outcome
                    .opportunity()
                    .is_some_and(|opportunity| self.calculator.is_profitable(opportunity))
            })
            .collect();
        opportunities.sort_by(|a, b| b.profit.total_cmp(&a.profit));
        opportunities
    }

    /// Execute an opportunity against the live pools.
    ///
    /// Both write locks are taken in `PoolId` order. The search is re-run on
    /// the locked state and the trade is rejected if the pools moved.
    pub async fn execute(&self, opportunity: &Opportunity) -> Result<ArbitrageReport, ArbitrageError> {
        if opportunity.first_pool == opportunity.second_pool {
            return Err(ArbitrageError::SamePool);
        }
        let first = self.pools.get(opportunity.first_pool)?;
        let second = self.pools.get(opportunity.second_pool)?;

        let (mut first_guard, mut second_guard) = if opportunity.first_pool < opportunity.second_pool {
            let f = first.write().await;
            let s = second.write().await;
            (f, s)
        } else {
            let s = second.write().await;
            let f = first.write().await;
            (f, s)
        };

        let current = self.finder.find_arbitrage(&first_guard, &second_guard)?;
        let current_amount = current.amount_to_swap();
        let still_valid = current.first_pool() == Some(opportunity.first_pool)
            && approx_eq(current_amount, opportunity.amount_to_swap);
        if !still_valid {
            return Err(ArbitrageError::Stale {
                expected_amount: opportunity.amount_to_swap,
                current_amount,
            });
        }

        let before = (first_guard.clone(), second_guard.clone());
        let execution = self
            .calculator
            .execute(opportunity, &mut first_guard, &mut second_guard)?;

        Ok(ArbitrageReport::new(&before.0, &before.1, current).with_execution(execution))
    }

    /// Find the best opportunity and execute it, if any
    pub async fn execute_best(&self) -> Result<Option<ArbitrageReport>, ArbitrageError> {
        let best = self.find_opportunities().await.into_iter().next();
        let Some(report) = best else {
            info!("No profitable arbitrage opportunity");
            return Ok(None);
        };
        let ArbitrageOutcome::Opportunity(opportunity) = &report.outcome else {
            return Ok(None);
        };

        self.execute(opportunity).await.map(Some)
    }

    /// Scan on an interval while a background trader moves the pools.
    ///
    /// Returns the number of opportunities seen and trades made.
    pub async fn monitor(
        &self,
        interval: Duration,
        iterations: usize,
        trades: usize,
        auto_execute: bool,
    ) -> MonitorStats {
        let trader = spawn_random_trader(self.pools.clone(), trades, interval / 2);
        let mut stats = MonitorStats::default();
        let mut ticker = tokio::time::interval(interval);

        for round in 0..iterations {
            ticker.tick().await;
            let opportunities = self.find_opportunities().await;
            stats.scans += 1;
            stats.opportunities_found += opportunities.len();
            debug!(round, found = opportunities.len(), "Scan complete");

            if !auto_execute {
                for report in &opportunities {
                    info!(
                        first = ?report.first_pool,
                        second = ?report.second_pool,
                        amount = report.amount_to_swap,
                        profit = report.profit,
                        "Arbitrage opportunity"
                    );
                }
                continue;
            }

            if let Some(ArbitrageOutcome::Opportunity(opportunity)) =
                opportunities.first().map(|report| &report.outcome)
            {
                match self.execute(opportunity).await {
                    Ok(report) => {
                        stats.executed += 1;
                        stats.total_profit += report
                            .execution
                            .as_ref()
                            .map(|execution| execution.realized_profit)
                            .unwrap_or(0.0);
                    }
                    Err(ArbitrageError::Stale { .. }) => {
                        stats.stale += 1;
                        debug!("Pools moved before execution");
                    }
                    Err(e) => warn!("Execution failed: {}", e),
                }
            }
        }

        match trader.await {
            Ok(trader_stats) => stats.user_swaps = trader_stats,
            Err(e) => warn!("Trader task failed: {}", e),
        }
        stats
    }
}

/// Monitor counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorStats {
    pub scans: usize,
    pub opportunities_found: usize,
    pub executed: usize,
    pub stale: usize,
    pub user_swaps: usize,
    pub total_profit: f64,
}

/// Background user making small random swaps against random pools
fn spawn_random_trader(pools: PoolManager, trades: usize, pause: Duration) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let ids = pools.pool_ids();
        let mut user = UserAccount::new(1_000.0, 1_000.0);
        let mut completed = 0;

        for _ in 0..trades {
            if ids.is_empty() {
                break;
            }
            let (id, from, fraction) = {
                let mut rng = rand::thread_rng();
                let id = ids[rng.gen_range(0..ids.len())];
                let from = if rng.gen_bool(0.5) { Asset::Dai } else { Asset::Eth };
                (id, from, rng.gen_range(0.001..0.02))
            };

            let Ok(pool) = pools.get(id) else { continue };
            let result: Result<f64, AccountError> = {
                let mut guard = pool.write().await;
                let amount = guard.reserve(from) * fraction;
                user.swap(&mut guard, from, from.other(), amount.min(user.balance(from)))
            };
            match result {
                Ok(out) => {
                    completed += 1;
                    debug!(pool = %id, %from, out, "Random trader swap");
                }
                Err(e) => debug!(pool = %id, "Random trader swap rejected: {}", e),
            }

            tokio::time::sleep(pause).await;
        }
        completed
    })
}
