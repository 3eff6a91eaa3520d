//! Ammarb - constant-product AMM simulator and cross-pool arbitrage finder

pub mod application;
pub mod domain;
pub mod math;
pub mod report;
pub mod shared;

// Re-export main types for convenience
pub use domain::account::UserAccount;
pub use domain::arbitrage::{find_arbitrage, ArbitrageFinder, ArbitrageOutcome, Opportunity};
pub use domain::pool::{LiquidityPool, PoolManager};
pub use shared::errors::{AccountError, AppError, ArbitrageError, PoolError};
pub use shared::types::{Asset, PoolId};
