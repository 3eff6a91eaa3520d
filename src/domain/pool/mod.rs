//! Pool domain - liquidity pool state and management

mod liquidity_pool;
mod pool_manager;

pub use liquidity_pool::LiquidityPool;
pub use pool_manager::{PoolManager, SharedPool};
